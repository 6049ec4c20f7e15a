mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

async fn sensor_pair(server: &TestServer) -> Result<(String, String, String)> {
    let farm = server.create("/farms", json!({ "name": "Readings Farm" })).await?;
    let node = server.create("/iot", json!({ "name": "station", "farm": farm })).await?;
    let temp = server
        .create("/sensors", json!({ "name": "air", "type": "temperature", "measurement_unit": "C", "iot": node }))
        .await?;
    let humidity = server
        .create("/sensors", json!({ "name": "rh", "type": "humidity", "measurement_unit": "%", "iot": node }))
        .await?;
    Ok((node, temp, humidity))
}

#[tokio::test]
async fn batch_insert_creates_one_record_per_entry() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, temp, humidity) = sensor_pair(&server).await?;

    let batch = json!([
        { "sensor": temp, "value": "21.5", "timestamp": "2024-06-20T12:00:00Z" },
        { "sensor": temp, "value": 22 },
        { "sensor": humidity, "value": "64" }
    ]);
    let (status, body) = server.post("/readings", batch).await?;
    assert_eq!(status, StatusCode::CREATED);

    let created = body["data"].as_array().unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(created[1]["value"], "22");
    assert_eq!(created[0]["timestamp"], "2024-06-20T12:00:00Z");

    for reading in created {
        let id = reading["id"].as_str().unwrap();
        let (status, fetched) = server.get(&format!("/readings/{}", id)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["value"], reading["value"]);
    }

    let (_, body) = server.get(&format!("/readings?sensor={}", temp)).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn empty_batch_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.post("/readings", json!([])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, body) = server.get("/readings").await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn invalid_entry_rejects_whole_batch_before_insert() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, temp, _) = sensor_pair(&server).await?;

    let (status, _) = server
        .post("/readings", json!([{ "sensor": temp, "value": "1" }, { "value": "2" }]))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get("/readings").await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn readings_by_iot_nests_sensors_and_values() -> Result<()> {
    let server = TestServer::start().await?;
    let (node, temp, humidity) = sensor_pair(&server).await?;
    server
        .post(
            "/readings",
            json!([
                { "sensor": temp, "value": "19.0" },
                { "sensor": temp, "value": "19.4" },
                { "sensor": humidity, "value": "70" }
            ]),
        )
        .await?;

    let (status, body) = server.get(&format!("/readings/iot/{}", node)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], node.as_str());

    let sensors = body["data"]["sensors"].as_array().unwrap();
    let count_for = |id: &str| -> usize {
        sensors
            .iter()
            .find(|s| s["id"] == id)
            .and_then(|s| s["readings"].as_array())
            .map(Vec::len)
            .unwrap_or(0)
    };
    assert_eq!(count_for(&temp), 2);
    assert_eq!(count_for(&humidity), 1);

    let (_, body) = server.get(&format!("/sensors/{}", temp)).await?;
    assert_eq!(body["data"]["readings"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn deleted_reading_is_gone() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, temp, _) = sensor_pair(&server).await?;

    let (_, body) = server.post("/readings", json!([{ "sensor": temp, "value": "5" }])).await?;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, deleted): (StatusCode, Value) = server.delete(&format!("/readings/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["id"], id.as_str());

    let (status, _) = server.get(&format!("/readings/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Farm, IotNode, Reading, Sensor};
use crate::database::{group_by_parent, Collection, DatabaseError, Document, Store};

/// Farm with its IoT nodes, each carrying its sensors
#[derive(Debug, Clone, Serialize)]
pub struct FarmDetail {
    #[serde(flatten)]
    pub farm: Farm,
    pub iots: Vec<IotDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IotDetail<S = Sensor> {
    #[serde(flatten)]
    pub iot: IotNode,
    pub sensors: Vec<S>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorDetail {
    #[serde(flatten)]
    pub sensor: Sensor,
    pub readings: Vec<Reading>,
}

/// Response body for routes honouring `?expand=`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Expansion<B, F> {
    Bare(B),
    Expanded(F),
}

/// Pair each parent with its children using one `list_by_parents` query
async fn attach<P, C, O>(
    parents: Vec<P>,
    children: &dyn Collection<C>,
    join: impl Fn(P, Vec<C>) -> O,
) -> Result<Vec<O>, DatabaseError>
where
    P: Document,
    C: Document,
{
    if parents.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<Uuid> = parents.iter().map(Document::id).collect();
    let mut grouped = group_by_parent(children.list_by_parents(&ids).await?);

    Ok(parents
        .into_iter()
        .map(|parent| {
            let kids = grouped.remove(&parent.id()).unwrap_or_default();
            join(parent, kids)
        })
        .collect())
}

pub async fn iots_with_sensors(store: &Store, iots: Vec<IotNode>) -> Result<Vec<IotDetail>, DatabaseError> {
    attach(iots, store.sensors.as_ref(), |iot, sensors| IotDetail { iot, sensors }).await
}

pub async fn sensors_with_readings(
    store: &Store,
    sensors: Vec<Sensor>,
) -> Result<Vec<SensorDetail>, DatabaseError> {
    attach(sensors, store.readings.as_ref(), |sensor, readings| SensorDetail { sensor, readings }).await
}

/// Farm → IoT nodes → sensors
pub async fn farm_detail(store: &Store, farm: Farm) -> Result<FarmDetail, DatabaseError> {
    let iots = store.iots.list(Some(farm.id)).await?;
    let iots = iots_with_sensors(store, iots).await?;
    Ok(FarmDetail { farm, iots })
}

/// IoT node → sensors → readings
pub async fn iot_with_readings(store: &Store, iot: IotNode) -> Result<IotDetail<SensorDetail>, DatabaseError> {
    let sensors = store.sensors.list(Some(iot.id)).await?;
    let sensors = sensors_with_readings(store, sensors).await?;
    Ok(IotDetail { iot, sensors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{FarmInput, IotInput, ReadingInput, SensorInput};

    fn sensor(name: &str, iot: Uuid) -> SensorInput {
        SensorInput {
            name: name.to_string(),
            sensor_type: "temperature".to_string(),
            measurement_unit: Some("C".to_string()),
            iot,
        }
    }

    #[tokio::test]
    async fn farm_detail_nests_two_levels() {
        let store = Store::memory();
        let farm = store
            .farms
            .create(FarmInput {
                name: "Riverside".into(),
                ..FarmInput::default()
            })
            .await
            .unwrap();
        let gateway = store.iots.create(IotInput::new("gateway", farm.id)).await.unwrap();
        let idle = store.iots.create(IotInput::new("idle", farm.id)).await.unwrap();
        store.sensors.create(sensor("t1", gateway.id)).await.unwrap();
        store.sensors.create(sensor("t2", gateway.id)).await.unwrap();

        let detail = farm_detail(&store, farm).await.unwrap();
        assert_eq!(detail.iots.len(), 2);
        let by_id = |id: Uuid| detail.iots.iter().find(|d| d.iot.id == id).unwrap();
        assert_eq!(by_id(gateway.id).sensors.len(), 2);
        assert!(by_id(idle.id).sensors.is_empty());

        let body = serde_json::to_value(&detail).unwrap();
        assert_eq!(body["name"], "Riverside");
        assert_eq!(body["iots"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn iot_with_readings_groups_by_sensor() {
        let store = Store::memory();
        let node = store.iots.create(IotInput::new("n1", Uuid::new_v4())).await.unwrap();
        let t1 = store.sensors.create(sensor("t1", node.id)).await.unwrap();
        let t2 = store.sensors.create(sensor("t2", node.id)).await.unwrap();
        store
            .readings
            .create_many(vec![
                ReadingInput::new(t1.id, "20.1"),
                ReadingInput::new(t1.id, "20.4"),
                ReadingInput::new(t2.id, "55"),
            ])
            .await
            .unwrap();

        let detail = iot_with_readings(&store, node).await.unwrap();
        let counts: Vec<(Uuid, usize)> = detail
            .sensors
            .iter()
            .map(|s| (s.sensor.id, s.readings.len()))
            .collect();
        assert_eq!(counts, vec![(t1.id, 2), (t2.id, 1)]);
    }

    #[tokio::test]
    async fn expansion_serializes_bare_or_nested() {
        let store = Store::memory();
        let node = store.iots.create(IotInput::new("n1", Uuid::new_v4())).await.unwrap();

        let bare: Expansion<IotNode, IotDetail> = Expansion::Bare(node.clone());
        assert!(serde_json::to_value(&bare).unwrap().get("sensors").is_none());

        let expanded: Expansion<IotNode, IotDetail> =
            Expansion::Expanded(iots_with_sensors(&store, vec![node]).await.unwrap().remove(0));
        assert_eq!(serde_json::to_value(&expanded).unwrap()["sensors"], serde_json::json!([]));
    }
}

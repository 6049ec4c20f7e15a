pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::StoreBackend;
use memory::MemoryCollection;
use models::{Farm, Group, IotNode, Permission, Reading, Sensor, User};
use postgres::PgCollection;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{group_by_parent, Collection, Document};

pub type SharedCollection<T> = Arc<dyn Collection<T>>;

/// Handle to every collection, opened once at startup and cloned into each request
#[derive(Clone)]
pub struct Store {
    backend: StoreBackend,
    pub users: SharedCollection<User>,
    pub groups: SharedCollection<Group>,
    pub permissions: SharedCollection<Permission>,
    pub farms: SharedCollection<Farm>,
    pub iots: SharedCollection<IotNode>,
    pub sensors: SharedCollection<Sensor>,
    pub readings: SharedCollection<Reading>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            backend: StoreBackend::Postgres,
            users: Arc::new(PgCollection::<User>::new(pool.clone())),
            groups: Arc::new(PgCollection::<Group>::new(pool.clone())),
            permissions: Arc::new(PgCollection::<Permission>::new(pool.clone())),
            farms: Arc::new(PgCollection::<Farm>::new(pool.clone())),
            iots: Arc::new(PgCollection::<IotNode>::new(pool.clone())),
            sensors: Arc::new(PgCollection::<Sensor>::new(pool.clone())),
            readings: Arc::new(PgCollection::<Reading>::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            users: Arc::new(MemoryCollection::<User>::new()),
            groups: Arc::new(MemoryCollection::<Group>::new()),
            permissions: Arc::new(MemoryCollection::<Permission>::new()),
            farms: Arc::new(MemoryCollection::<Farm>::new()),
            iots: Arc::new(MemoryCollection::<IotNode>::new()),
            sensors: Arc::new(MemoryCollection::<Sensor>::new()),
            readings: Arc::new(MemoryCollection::<Reading>::new()),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    /// Round-trip to the backing store
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.users.ping().await
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("backend", &self.backend).finish_non_exhaustive()
    }
}

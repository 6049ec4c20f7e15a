pub mod expand;

pub use expand::{Expansion, FarmDetail, IotDetail, SensorDetail};

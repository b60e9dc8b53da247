pub mod storage;
pub mod telemetry;
pub mod utils;

pub use storage::{StorageError, TextFileStorage};

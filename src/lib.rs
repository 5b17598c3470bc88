// Library root - regularized time series from raw historian readings
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use crate::application::error::QueryError;
pub use crate::application::historian_query::{HistorianQuery, QuerySpec};
pub use crate::application::reading_store::{ReadingStore, ScanFilter};
pub use crate::domain::quality::QualityPolicy;
pub use crate::domain::reading::{RawReading, ResampledPoint};
pub use crate::infrastructure::memory_store::MemoryStore;

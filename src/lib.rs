pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod records;
pub mod storage;
pub mod store;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use records::{Directory, Gallery, Treatments};
pub use store::Store;
pub use voice::{AudioUpload, ExtractionCandidate, ExtractionPipeline};

pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{DownloadDirective, DownloadRequest, ExportPhase, EXPORT_DELAY, SUGGESTED_FILENAME};

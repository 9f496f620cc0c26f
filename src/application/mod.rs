pub mod export;
pub mod native_download;
pub mod trigger;

pub use export::ExportJob;
pub use native_download::{DownloadCoordinator, DownloadEvent, NativeDownloads};
pub use trigger::{ActionControl, DownloadTrigger, ProgressIndicator};

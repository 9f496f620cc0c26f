use std::time::Duration;

/// Filename the runtime is asked to save the video under.
pub const SUGGESTED_FILENAME: &str = "video_memorial.mp4";

/// How long the simulated export keeps the progress indicator on screen.
pub const EXPORT_DELAY: Duration = Duration::from_millis(2000);

/// A single click-to-completion cycle, carrying the URL captured at click time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
}

/// Transient instruction for the runtime to save `href` as `download_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDirective {
    pub id: u64,
    pub href: String,
    pub download_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPhase {
    #[default]
    Idle,
    Exporting,
}

use clap::Parser;
use std::path::PathBuf;

/// Desktop page for sharing a memorial video.
#[derive(Parser, Debug)]
#[clap(
    name = "memorial-share",
    version,
    about = "Show a memorial video page with a download button"
)]
pub struct Cli {
    /// URL of the video behind the share button
    #[clap(env = "MEMORIAL_VIDEO_URL")]
    pub video_url: Option<String>,

    /// Path to a JSON config file
    #[clap(long, env = "MEMORIAL_SHARE_CONFIG")]
    pub config: Option<PathBuf>,
}

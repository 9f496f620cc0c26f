mod api;
mod app;
mod application;
mod cli;
mod config;
mod domain;
mod ui;
mod utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    let config = match config::ShareConfig::load(cli.config.as_deref(), cli.video_url) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration, using defaults");
            config::ShareConfig::default()
        }
    };

    iced::application(
        move || app::ShareApp::new(config.clone()),
        app::update,
        app::view,
    )
    .title("Memorial Video")
    .run()
}

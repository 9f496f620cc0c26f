use crate::api::MediaClient;
use crate::application::{
    DownloadCoordinator, DownloadEvent, DownloadTrigger, ExportJob, NativeDownloads,
};
use crate::config::ShareConfig;
use crate::domain::{AppError, DownloadDirective, DownloadRequest, ExportPhase};
use crate::ui::{LoadingBar, ShareButton, ShareMessage, ShareView};
use futures::{stream::BoxStream, StreamExt};
use iced::Task;
use std::path::PathBuf;
use tracing::{error, info};

type ShareTrigger = DownloadTrigger<ShareButton, LoadingBar, NativeDownloads>;

pub struct ShareApp {
    view: ShareView,
    trigger: Option<ShareTrigger>,
    export_job: ExportJob,
    coordinator: DownloadCoordinator,
}

impl ShareApp {
    pub fn new(config: ShareConfig) -> Self {
        // Pages without a video have no share button.
        let share_button = config.video_url.clone().map(|url| ShareButton::new(Some(url)));
        let trigger = DownloadTrigger::wire(
            share_button,
            LoadingBar::default(),
            NativeDownloads::default(),
            config.suggested_filename.clone(),
        );
        let export_job = ExportJob::new(config.export_delay());

        let mut view = ShareView::default();
        if trigger.is_none() {
            view.status_message = "No video available yet".to_string();
        } else {
            info!(
                delay_ms = export_job.delay().as_millis() as u64,
                filename = %config.suggested_filename,
                "Share button wired"
            );
        }

        Self {
            view,
            trigger,
            export_job,
            coordinator: DownloadCoordinator::new(MediaClient::new(), config.download_dir),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(ShareMessage),
    ExportFinished(Result<DownloadRequest, AppError>),
    /// (Selected Path, Directive to carry out)
    SaveLocationChosen(Option<PathBuf>, DownloadDirective),
    Download(DownloadEvent),
}

pub fn update(app: &mut ShareApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ShareMessage::SharePressed) => {
            let Some(trigger) = app.trigger.as_mut() else {
                return Task::none();
            };
            if trigger.phase() == ExportPhase::Exporting {
                app.view.status_message = "Export already in progress".to_string();
                return Task::none();
            }
            if let Some(request) = trigger.click() {
                app.view.status_message = "Preparing your video...".to_string();
                return Task::perform(app.export_job.run(request), Message::ExportFinished);
            }
        }
        Message::ExportFinished(outcome) => {
            let tasks = finish_export(app, outcome)
                .into_iter()
                .map(|directive| {
                    Task::perform(save_location(app.coordinator.clone(), directive), |m| m)
                })
                .collect::<Vec<_>>();
            return Task::batch(tasks);
        }
        Message::SaveLocationChosen(path_opt, directive) => match path_opt {
            Some(path) => {
                app.view.status_message = format!("Downloading to: {}", path.display());
                return Task::stream(download_messages(&app.coordinator, directive, path));
            }
            None => {
                info!(directive = directive.id, "Save dialog dismissed");
                app.view.status_message = "Download cancelled".to_string();
            }
        },
        Message::Download(event) => match event {
            DownloadEvent::Progress(progress) => {
                app.view.download_progress = progress;
                app.view.status_message = format!("Downloading: {:.1}%", progress * 100.0);
            }
            DownloadEvent::Completed(path) => {
                app.view.download_progress = 0.0;
                app.view.status_message = format!("Saved: {}", path.display());
            }
            DownloadEvent::Failed(e) => {
                error!(error = %e, "Download failed");
                app.view.download_progress = 0.0;
                app.view.status_message = format!("Download failed: {}", e);
            }
        },
    }
    Task::none()
}

/// Moves the trigger back to idle and returns the directives it activated.
fn finish_export(
    app: &mut ShareApp,
    outcome: Result<DownloadRequest, AppError>,
) -> Vec<DownloadDirective> {
    let Some(trigger) = app.trigger.as_mut() else {
        return Vec::new();
    };
    if let Err(e) = &outcome {
        app.view.status_message = format!("Export failed: {}", e);
    }
    trigger.complete(outcome);

    let directives = trigger.surface_mut().take_activated();
    if !directives.is_empty() {
        app.view.status_message = "Please select save location...".to_string();
    }
    directives
}

async fn save_location(coordinator: DownloadCoordinator, directive: DownloadDirective) -> Message {
    let path = coordinator.choose_save_path(&directive).await;
    Message::SaveLocationChosen(path, directive)
}

fn download_messages(
    coordinator: &DownloadCoordinator,
    directive: DownloadDirective,
    path: PathBuf,
) -> BoxStream<'static, Message> {
    coordinator.save(directive, path).map(Message::Download).boxed()
}

pub fn view(app: &ShareApp) -> iced::Element<'_, Message> {
    let share_button = app.trigger.as_ref().map(|t| t.control());
    let loading_bar = app.trigger.as_ref().map(|t| t.indicator());
    app.view
        .view(share_button, loading_bar)
        .map(Message::UiMessage)
}

use std::collections::VecDeque;
use std::path::PathBuf;

use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiError, MediaClient},
    application::trigger::DownloadSurface,
    domain::{AppError, DownloadDirective},
    utils::sanitize_filename,
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(AppError),
}

/// Runtime side of the download trigger.
///
/// Directives are only reachable while attached; activating one queues it
/// for the application to carry out.
#[derive(Debug, Default)]
pub struct NativeDownloads {
    attached: Vec<DownloadDirective>,
    activated: VecDeque<DownloadDirective>,
}

impl NativeDownloads {
    #[cfg(test)]
    pub fn attached(&self) -> &[DownloadDirective] {
        &self.attached
    }

    pub fn take_activated(&mut self) -> Vec<DownloadDirective> {
        self.activated.drain(..).collect()
    }
}

impl DownloadSurface for NativeDownloads {
    fn attach(&mut self, directive: &DownloadDirective) {
        self.attached.push(directive.clone());
    }

    fn activate(&mut self, directive: &DownloadDirective) {
        if !self.attached.iter().any(|d| d.id == directive.id) {
            debug!(directive = directive.id, "Activated a detached directive, ignoring");
            return;
        }
        self.activated.push_back(directive.clone());
    }

    fn detach(&mut self, directive: &DownloadDirective) {
        self.attached.retain(|d| d.id != directive.id);
    }
}

/// Carries out activated directives: picks a target path and streams the file.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: MediaClient,
    download_dir: Option<PathBuf>,
}

impl DownloadCoordinator {
    pub fn new(client: MediaClient, download_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            download_dir,
        }
    }

    /// `None` means the user dismissed the save dialog.
    pub async fn choose_save_path(&self, directive: &DownloadDirective) -> Option<PathBuf> {
        let filename = sanitize_filename(&directive.download_name);
        match &self.download_dir {
            Some(dir) => Some(dir.join(filename)),
            None => rfd::AsyncFileDialog::new()
                .set_file_name(&filename)
                .save_file()
                .await
                .map(|handle| handle.path().to_path_buf()),
        }
    }

    /// Saves `directive.href` to `target`.
    ///
    /// The target file only exists once the server has answered, and it is
    /// removed again if the transfer fails part way.
    pub fn save(
        &self,
        directive: DownloadDirective,
        target: PathBuf,
    ) -> BoxStream<'static, DownloadEvent> {
        let step = Step::Connect {
            client: self.client.clone(),
            directive,
            target,
        };

        futures::stream::unfold(step, |step| async move {
            match step {
                Step::Connect {
                    client,
                    directive,
                    target,
                } => match Transfer::open(&client, &directive, target).await {
                    Ok(transfer) => {
                        Some((DownloadEvent::Progress(0.0), Step::Transfer(transfer)))
                    }
                    Err(e) => {
                        warn!(directive = directive.id, error = %e, "Download could not start");
                        Some((DownloadEvent::Failed(e), Step::Done))
                    }
                },
                Step::Transfer(transfer) => Some(transfer.advance().await),
                Step::Done => None,
            }
        })
        .boxed()
    }
}

enum Step {
    Connect {
        client: MediaClient,
        directive: DownloadDirective,
        target: PathBuf,
    },
    Transfer(Transfer),
    Done,
}

/// One directive in flight: the response body and the file it lands in.
struct Transfer {
    directive_id: u64,
    body: BoxStream<'static, crate::api::Result<Bytes>>,
    file: PartialFile,
    received: u64,
    total: Option<u64>,
}

impl Transfer {
    async fn open(
        client: &MediaClient,
        directive: &DownloadDirective,
        target: PathBuf,
    ) -> Result<Self, AppError> {
        let (total, body) = client
            .download_file_stream(&directive.href)
            .await
            .map_err(api_error)?;
        let file = PartialFile::create(target).await?;

        info!(
            directive = directive.id,
            url = %directive.href,
            path = %file.path.display(),
            "Download started"
        );
        Ok(Self {
            directive_id: directive.id,
            body: body.boxed(),
            file,
            received: 0,
            total,
        })
    }

    async fn advance(mut self) -> (DownloadEvent, Step) {
        let next = self.body.next().await;
        let failure = match next {
            Some(Ok(chunk)) => match self.file.append(&chunk).await {
                Ok(()) => {
                    self.received += chunk.len() as u64;
                    let progress = self.progress();
                    return (DownloadEvent::Progress(progress), Step::Transfer(self));
                }
                Err(e) => e,
            },
            Some(Err(e)) => api_error(e),
            None => {
                let (id, received) = (self.directive_id, self.received);
                return match self.file.finish().await {
                    Ok(path) => {
                        info!(
                            directive = id,
                            bytes = received,
                            path = %path.display(),
                            "Download finished"
                        );
                        (DownloadEvent::Completed(path), Step::Done)
                    }
                    Err(e) => {
                        warn!(directive = id, error = %e, "Download could not be finalized");
                        (DownloadEvent::Failed(e), Step::Done)
                    }
                };
            }
        };

        warn!(directive = self.directive_id, error = %failure, "Download interrupted");
        self.file.discard().await;
        (DownloadEvent::Failed(failure), Step::Done)
    }

    fn progress(&self) -> f32 {
        match self.total {
            Some(total) if total > 0 => self.received as f32 / total as f32,
            _ => 0.0,
        }
    }
}

/// Target file that is either finished or removed, never left half written.
struct PartialFile {
    file: tokio::fs::File,
    path: PathBuf,
}

impl PartialFile {
    async fn create(path: PathBuf) -> Result<Self, AppError> {
        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        Ok(Self { file, path })
    }

    async fn append(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| AppError::Io(format!("Write error: {}", e)))
    }

    async fn finish(self) -> Result<PathBuf, AppError> {
        let synced = self.file.sync_all().await;
        if let Err(e) = synced {
            self.discard().await;
            return Err(AppError::Io(format!("Failed to sync file: {}", e)));
        }
        Ok(self.path)
    }

    async fn discard(self) {
        let Self { file, path } = self;
        drop(file);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!(path = %path.display(), error = %e, "Could not remove partial download");
        }
    }
}

fn api_error(e: ApiError) -> AppError {
    match e {
        ApiError::UnsupportedUrl(url) => AppError::InvalidUrl(url),
        other => AppError::Api(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(id: u64) -> DownloadDirective {
        directive_for(id, "https://example.com/v1.mp4".to_string())
    }

    fn directive_for(id: u64, href: String) -> DownloadDirective {
        DownloadDirective {
            id,
            href,
            download_name: "video_memorial.mp4".to_string(),
        }
    }

    #[test]
    fn test_activate_queues_attached_directive() {
        let mut surface = NativeDownloads::default();
        let d = directive(1);

        surface.attach(&d);
        surface.activate(&d);
        surface.detach(&d);

        assert!(surface.attached().is_empty());
        assert_eq!(surface.take_activated(), vec![d]);
        assert!(surface.take_activated().is_empty());
    }

    #[test]
    fn test_activate_detached_directive_is_ignored() {
        let mut surface = NativeDownloads::default();
        surface.activate(&directive(7));
        assert!(surface.take_activated().is_empty());
    }

    #[tokio::test]
    async fn test_choose_save_path_uses_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator =
            DownloadCoordinator::new(MediaClient::new(), Some(dir.path().to_path_buf()));

        let path = coordinator.choose_save_path(&directive(1)).await;

        assert_eq!(path, Some(dir.path().join("video_memorial.mp4")));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1.mp4")
            .with_status(200)
            .with_body("memorial video")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_memorial.mp4");
        let coordinator = DownloadCoordinator::new(MediaClient::new(), None);

        let events: Vec<DownloadEvent> = coordinator
            .save(directive_for(1, format!("{}/v1.mp4", server.url())), path.clone())
            .collect()
            .await;

        assert!(matches!(events.first(), Some(DownloadEvent::Progress(p)) if *p == 0.0));
        assert!(events
            .iter()
            .any(|e| matches!(e, DownloadEvent::Progress(p) if *p >= 1.0)));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(p)) if *p == path));
        assert_eq!(std::fs::read(&path).unwrap(), b"memorial video");
    }

    #[tokio::test]
    async fn test_save_empty_url_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_memorial.mp4");
        let coordinator = DownloadCoordinator::new(MediaClient::new(), None);

        let events: Vec<DownloadEvent> = coordinator
            .save(directive_for(1, String::new()), path.clone())
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DownloadEvent::Failed(AppError::InvalidUrl(_))
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_server_error_leaves_no_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.mp4")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_memorial.mp4");
        let coordinator = DownloadCoordinator::new(MediaClient::new(), None);

        let events: Vec<DownloadEvent> = coordinator
            .save(directive_for(1, format!("{}/gone.mp4", server.url())), path.clone())
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events.last(),
            Some(DownloadEvent::Failed(AppError::Api(_)))
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1.mp4")
            .with_status(200)
            .with_body("memorial video")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("video_memorial.mp4");
        let coordinator = DownloadCoordinator::new(MediaClient::new(), None);

        let events: Vec<DownloadEvent> = coordinator
            .save(directive_for(1, format!("{}/v1.mp4", server.url())), path.clone())
            .collect()
            .await;

        assert!(matches!(
            events.last(),
            Some(DownloadEvent::Failed(AppError::Io(_)))
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_discarded_partial_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_memorial.mp4");

        let mut partial = PartialFile::create(path.clone()).await.unwrap();
        partial.append(b"half a vid").await.unwrap();
        assert!(path.exists());

        partial.discard().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_finished_partial_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_memorial.mp4");

        let mut partial = PartialFile::create(path.clone()).await.unwrap();
        partial.append(b"whole video").await.unwrap();

        assert_eq!(partial.finish().await.unwrap(), path);
        assert_eq!(std::fs::read(&path).unwrap(), b"whole video");
    }
}

use iced::{
    widget::{button, column, progress_bar, text, Space},
    Element, Length,
};

use crate::application::{ActionControl, ProgressIndicator};

/// The share button, carrying the video URL as its custom data.
#[derive(Debug, Clone)]
pub struct ShareButton {
    pub video_url: Option<String>,
    pub visible: bool,
    pub enabled: bool,
}

impl ShareButton {
    pub fn new(video_url: Option<String>) -> Self {
        Self {
            video_url,
            visible: true,
            enabled: true,
        }
    }
}

impl ActionControl for ShareButton {
    fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Loading bar shown while the export runs.
#[derive(Debug, Clone, Default)]
pub struct LoadingBar {
    pub visible: bool,
}

impl ProgressIndicator for LoadingBar {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[derive(Debug, Clone)]
pub enum ShareMessage {
    SharePressed,
}

/// Main view state
pub struct ShareView {
    pub status_message: String,
    pub download_progress: f32,
}

impl Default for ShareView {
    fn default() -> Self {
        Self {
            status_message: String::new(),
            download_progress: 0.0,
        }
    }
}

impl ShareView {
    pub fn view<'a>(
        &'a self,
        share_button: Option<&'a ShareButton>,
        loading_bar: Option<&'a LoadingBar>,
    ) -> Element<'a, ShareMessage> {
        let mut content = column![
            text("Memorial Video").size(32),
            Space::new().height(Length::Fixed(20.0)),
        ];

        if let Some(share) = share_button.filter(|b| b.visible) {
            let mut share_button = button("Download video").padding([10, 20]);
            if share.enabled {
                share_button = share_button.on_press(ShareMessage::SharePressed);
            }
            content = content.push(share_button);
        }

        if loading_bar.is_some_and(|bar| bar.visible) {
            content = content
                .push(text("Exporting video...").size(16))
                .push(progress_bar(0.0..=1.0, 0.5));
        }

        if self.download_progress > 0.0 && self.download_progress < 1.0 {
            content = content.push(progress_bar(0.0..=1.0, self.download_progress));
        }

        content
            .push(Space::new().height(Length::Fixed(10.0)))
            .push(text(&self.status_message).size(14))
            .padding(20)
            .spacing(10)
            .into()
    }
}

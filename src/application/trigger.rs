//! Download Trigger Controller.
//!
//! Toggles the share button and the loading bar around one export cycle and
//! hands a download directive to the runtime once the export completes. The
//! UI elements and the runtime are injected, so nothing here knows about iced.

use tracing::{debug, info, warn};

use crate::domain::{AppError, DownloadDirective, DownloadRequest, ExportPhase};

/// The clickable element that starts an export cycle.
pub trait ActionControl {
    /// URL attached to the control's custom data, read at click time.
    fn video_url(&self) -> Option<&str>;
    fn set_visible(&mut self, visible: bool);
    fn set_enabled(&mut self, enabled: bool);
}

/// Element shown only while a cycle is in progress.
pub trait ProgressIndicator {
    fn set_visible(&mut self, visible: bool);
}

/// Runtime mechanism that turns a directive into a saved file.
pub trait DownloadSurface {
    fn attach(&mut self, directive: &DownloadDirective);
    fn activate(&mut self, directive: &DownloadDirective);
    fn detach(&mut self, directive: &DownloadDirective);
}

pub struct DownloadTrigger<C, I, S> {
    control: C,
    indicator: I,
    surface: S,
    phase: ExportPhase,
    suggested_filename: String,
    next_directive_id: u64,
}

impl<C, I, S> DownloadTrigger<C, I, S>
where
    C: ActionControl,
    I: ProgressIndicator,
    S: DownloadSurface,
{
    /// Wires the controller once the UI is ready.
    ///
    /// Returns `None` when the page has no action control; that is a valid
    /// page layout, not an error.
    pub fn wire(
        control: Option<C>,
        mut indicator: I,
        surface: S,
        suggested_filename: impl Into<String>,
    ) -> Option<Self> {
        let Some(mut control) = control else {
            debug!("No share button on this page, download trigger not wired");
            return None;
        };

        control.set_visible(true);
        control.set_enabled(true);
        indicator.set_visible(false);

        Some(Self {
            control,
            indicator,
            surface,
            phase: ExportPhase::Idle,
            suggested_filename: suggested_filename.into(),
            next_directive_id: 0,
        })
    }

    /// Handles a click: Idle -> Exporting.
    ///
    /// Returns the request the export job should carry, or `None` when a
    /// cycle is already in flight.
    pub fn click(&mut self) -> Option<DownloadRequest> {
        if self.phase == ExportPhase::Exporting {
            debug!("Share button clicked during an export, ignoring");
            return None;
        }

        let source_url = self.control.video_url().unwrap_or_default().to_string();
        if source_url.is_empty() {
            warn!("Share button has no video URL, the download will likely fail");
        }

        self.control.set_visible(false);
        self.control.set_enabled(false);
        self.indicator.set_visible(true);
        self.phase = ExportPhase::Exporting;

        info!(url = %source_url, "Export started");
        Some(DownloadRequest { source_url })
    }

    /// Handles export completion: Exporting -> Idle.
    ///
    /// A successful export is turned into a directive that is attached,
    /// activated and detached again. The UI is restored either way.
    pub fn complete(&mut self, outcome: Result<DownloadRequest, AppError>) {
        if self.phase != ExportPhase::Exporting {
            warn!("Export completion arrived while idle, ignoring");
            return;
        }

        match outcome {
            Ok(request) => {
                let directive = self.directive_for(request);
                self.surface.attach(&directive);
                self.surface.activate(&directive);
                self.surface.detach(&directive);
                info!(
                    directive = directive.id,
                    url = %directive.href,
                    filename = %directive.download_name,
                    "Download triggered"
                );
            }
            Err(e) => {
                warn!(error = %e, "Export failed, no download triggered");
            }
        }

        self.indicator.set_visible(false);
        self.control.set_visible(true);
        self.control.set_enabled(true);
        self.phase = ExportPhase::Idle;
    }

    fn directive_for(&mut self, request: DownloadRequest) -> DownloadDirective {
        self.next_directive_id += 1;
        DownloadDirective {
            id: self.next_directive_id,
            href: request.source_url,
            download_name: self.suggested_filename.clone(),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

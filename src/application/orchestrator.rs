use std::time::Duration;

use rand::Rng;
use tracing::{error, info, warn};

use super::progress::{ProgressEstimator, DEFAULT_TICK_INTERVAL};
use crate::domain::{
    normalize_sources, validate_quality, AppError, DownloadMode, DownloadOutcome,
    DownloadRequest, LifecycleStatus, MediaFormat, ResolvedDownload, ValidationError,
    GENERIC_FAILURE_MESSAGE,
};

pub const COMPLETE: f32 = 100.0;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Timing of a download session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Period between progress estimates while a request is in flight.
    pub tick_interval: Duration,
    /// How long the finished progress stays visible before returning to idle.
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// State of the download action.
///
/// Drives `Idle -> InFlight -> Resolving -> Settling -> Idle`. Only one
/// request can be active; every call that would start a second one while
/// the orchestrator is busy is refused.
#[derive(Debug, Default)]
pub struct Orchestrator {
    status: LifecycleStatus,
    progress: f32,
    progress_visible: bool,
    mode: Option<DownloadMode>,
    input_error: Option<String>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LifecycleStatus {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status != LifecycleStatus::Idle
    }

    /// Current progress, `None` while the indicator is hidden.
    pub fn progress(&self) -> Option<f32> {
        self.progress_visible.then_some(self.progress)
    }

    /// Mode of the active request.
    pub fn mode(&self) -> Option<DownloadMode> {
        self.mode
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn clear_input_error(&mut self) {
        self.input_error = None;
    }

    /// Validate user input and start a request.
    pub fn begin(
        &mut self,
        raw_sources: &str,
        format: MediaFormat,
        quality: &str,
    ) -> Result<DownloadRequest, AppError> {
        if self.is_busy() {
            warn!(status = ?self.status, "Ignoring download while another one is active");
            return Err(AppError::Busy);
        }

        let request = match Self::validate(raw_sources, format, quality) {
            Ok(request) => request,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.input_error = None;
        self.progress = 0.0;
        self.progress_visible = true;
        self.mode = Some(request.mode());
        self.status = LifecycleStatus::InFlight;

        info!(
            mode = ?request.mode(),
            sources = request.sources().len(),
            format = request.format().as_str(),
            quality = request.quality(),
            "Download started"
        );

        Ok(request)
    }

    fn validate(
        raw_sources: &str,
        format: MediaFormat,
        quality: &str,
    ) -> Result<DownloadRequest, ValidationError> {
        if raw_sources.trim().is_empty() {
            return Err(ValidationError::MissingSource);
        }
        let quality = validate_quality(quality)?;
        let sources = normalize_sources(raw_sources)?;
        DownloadRequest::new(sources, format, quality.to_string())
            .ok_or(ValidationError::NoValidSource)
    }

    /// Apply one estimate tick. Ignored unless a request is in flight.
    pub fn advance<R: Rng>(&mut self, estimator: &mut ProgressEstimator<R>) {
        if self.status == LifecycleStatus::InFlight {
            self.progress = estimator.next(self.progress).max(self.progress);
        }
    }

    /// The service answered. Progress jumps to completion.
    pub fn response_received(&mut self) {
        if self.status == LifecycleStatus::InFlight {
            self.status = LifecycleStatus::Resolving;
            self.progress = COMPLETE;
        }
    }

    /// Turn the result of the request into the outcome to deliver.
    ///
    /// The orchestrator stays `Resolving` until the outcome has been
    /// delivered and reported, see [`Orchestrator::start_settling`].
    pub fn conclude(
        &mut self,
        result: Result<ResolvedDownload, AppError>,
    ) -> DownloadOutcome {
        match self.status {
            LifecycleStatus::InFlight | LifecycleStatus::Resolving => self.response_received(),
            status => warn!(status = ?status, "Concluding a download that is not active"),
        }

        match result {
            Ok(ResolvedDownload { filename, bytes }) => {
                info!(filename = %filename, size = bytes.len(), "Download finished");
                DownloadOutcome::Success { filename, bytes }
            }
            Err(e) => {
                error!(error = %e, mode = ?self.mode, "Download error");
                DownloadOutcome::Failure {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Outcome delivered and reported. The indicator stays until [`Orchestrator::settle`].
    pub fn start_settling(&mut self) {
        if self.status == LifecycleStatus::Resolving {
            self.status = LifecycleStatus::Settling;
        }
    }

    /// Hide the indicator and accept new downloads again.
    pub fn settle(&mut self) {
        if self.status == LifecycleStatus::Settling {
            self.status = LifecycleStatus::Idle;
            self.progress_visible = false;
            self.mode = None;
        }
    }
}

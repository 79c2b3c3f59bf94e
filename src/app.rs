use std::path::PathBuf;

use iced::{Subscription, Task};
use reqwest::Response;
use tracing::debug;
use yt_downloader::api::{ApiClient, ApiConfig};
use yt_downloader::application::{
    DownloadCoordinator, FileDelivery, Orchestrator, ProgressEstimator, SaveDialogDelivery,
    SessionConfig,
};
use yt_downloader::application::response_resolver::resolve;
use yt_downloader::domain::{
    AppError, DownloadMode, DownloadOutcome, DownloadRequest, LifecycleStatus, Notification,
    ResolvedDownload,
};

use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: Orchestrator,
    coordinator: DownloadCoordinator,
    estimator: ProgressEstimator,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(ApiConfig::default());
        let coordinator = DownloadCoordinator::new(api_client, SessionConfig::default());

        Self {
            view: DownloadView::default(),
            orchestrator: Orchestrator::new(),
            coordinator,
            estimator: ProgressEstimator::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Periodic progress estimate while a request is in flight
    ProgressTick,
    /// The service answered, its body is being read
    ResponseReceived,
    /// Response body resolved into a payload, or the request failed
    Resolved(Result<ResolvedDownload, AppError>),
    /// Result of saving a payload of the given mode
    SaveFinished(DownloadMode, Result<PathBuf, AppError>),
    /// Settle delay elapsed
    Settled,
}

/// Internal state for the request stream
enum FetchState {
    Send {
        coordinator: DownloadCoordinator,
        request: DownloadRequest,
    },
    Resolve {
        response: Response,
        request: DownloadRequest,
    },
    Failed(AppError),
    Finished,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            if let DownloadMessage::SourcesChanged(_) = ui_msg {
                app.orchestrator.clear_input_error();
            }
            app.view.update(ui_msg.clone());

            if let DownloadMessage::DownloadPressed = ui_msg {
                let quality = app.view.quality.clone().unwrap_or_default();

                match app
                    .orchestrator
                    .begin(&app.view.sources, app.view.format, &quality)
                {
                    Ok(request) => {
                        app.view.notification = None;
                        app.view.status_message =
                            format!("Requesting {} source(s)...", request.sources().len());

                        return fetch_task(app.coordinator.clone(), request);
                    }
                    Err(AppError::Busy) => {}
                    Err(e) => {
                        debug!(error = %e, "Rejected download input");
                    }
                }
            }
        }
        Message::ProgressTick => {
            app.orchestrator.advance(&mut app.estimator);
        }
        Message::ResponseReceived => {
            app.orchestrator.response_received();
        }
        Message::Resolved(result) => {
            let mode = app.orchestrator.mode().unwrap_or(DownloadMode::Single);

            match app.orchestrator.conclude(result) {
                DownloadOutcome::Success { filename, bytes } => {
                    app.view.status_message = "Please select save location...".to_string();

                    // settling starts once the file is saved
                    return Task::perform(
                        async move { SaveDialogDelivery.deliver(&filename, bytes).await },
                        move |result| Message::SaveFinished(mode, result),
                    );
                }
                DownloadOutcome::Failure { message } => {
                    app.view.status_message = String::new();
                    app.view.notification = Some(Notification::error(message));
                    app.orchestrator.start_settling();
                    return settle_task(app.coordinator.config().settle_delay);
                }
            }
        }
        Message::SaveFinished(mode, result) => {
            match result {
                Ok(path) => {
                    app.view.status_message = format!("Saved: {}", path.display());
                    app.view.notification = Some(Notification::success(mode));
                }
                Err(e) => {
                    app.view.status_message = String::new();
                    app.view.notification = Some(Notification::error(e.user_message()));
                }
            }
            app.orchestrator.start_settling();
            return settle_task(app.coordinator.config().settle_delay);
        }
        Message::Settled => {
            app.orchestrator.settle();
        }
    }
    Task::none()
}

/// Sends the request, reports the response, then resolves its body.
fn fetch_task(coordinator: DownloadCoordinator, request: DownloadRequest) -> Task<Message> {
    Task::stream(futures::stream::unfold(
        FetchState::Send {
            coordinator,
            request,
        },
        |state| async move {
            match state {
                FetchState::Send {
                    coordinator,
                    request,
                } => {
                    let next = match coordinator.send(&request).await {
                        Ok(response) => FetchState::Resolve { response, request },
                        Err(e) => FetchState::Failed(e),
                    };
                    Some((Message::ResponseReceived, next))
                }
                FetchState::Resolve { response, request } => Some((
                    Message::Resolved(resolve(response, &request).await),
                    FetchState::Finished,
                )),
                FetchState::Failed(e) => Some((Message::Resolved(Err(e)), FetchState::Finished)),
                FetchState::Finished => None,
            }
        },
    ))
}

fn settle_task(delay: std::time::Duration) -> Task<Message> {
    Task::perform(tokio::time::sleep(delay), |_| Message::Settled)
}

/// Ticks exist only while a request is in flight, so leaving that state
/// cancels them.
pub fn subscription(app: &DownloadApp) -> Subscription<Message> {
    if app.orchestrator.status() == LifecycleStatus::InFlight {
        iced::time::every(app.coordinator.config().tick_interval).map(|_| Message::ProgressTick)
    } else {
        Subscription::none()
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(&app.orchestrator).map(Message::UiMessage)
}

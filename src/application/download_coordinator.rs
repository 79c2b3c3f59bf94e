use std::future::Future;
use std::path::PathBuf;

use bytes::Bytes;
use reqwest::Response;
use tracing::{error, info};

use super::orchestrator::{Orchestrator, SessionConfig};
use super::progress::{ProgressEstimator, ProgressTicker};
use super::response_resolver::resolve;
use crate::{
    api::ApiClient,
    domain::{
        AppError, DownloadMode, DownloadOutcome, DownloadRequest, MediaFormat, Notification,
    },
};

/// Raw values collected from the input form.
#[derive(Debug, Clone, Default)]
pub struct DownloadInput {
    /// Comma separated sources as typed by the user.
    pub sources: String,
    pub format: MediaFormat,
    pub quality: String,
}

/// Hands a finished payload to the local filesystem.
pub trait FileDelivery {
    fn deliver(
        &self,
        filename: &str,
        bytes: Bytes,
    ) -> impl Future<Output = Result<PathBuf, AppError>> + Send;
}

pub trait Notifier {
    fn notify(&self, notification: Notification);

    /// Called whenever the visible progress changes.
    fn progress_changed(&self, _progress: f32) {}
}

/// Writes every payload into one directory.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDelivery for DirectoryDelivery {
    async fn deliver(&self, filename: &str, bytes: Bytes) -> Result<PathBuf, AppError> {
        let path = self.dir.join(filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// Asks the user where to save, pre-filled with the resolved filename.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveDialogDelivery;

impl FileDelivery for SaveDialogDelivery {
    async fn deliver(&self, filename: &str, bytes: Bytes) -> Result<PathBuf, AppError> {
        let path = rfd::AsyncFileDialog::new()
            .set_file_name(filename)
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
            .ok_or(AppError::SaveCancelled)?;

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
    config: SessionConfig,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient, config: SessionConfig) -> Self {
        Self { api_client, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send the request. The body is left for [`resolve`].
    pub async fn send(&self, request: &DownloadRequest) -> Result<Response, AppError> {
        Ok(self.api_client.send(request).await?)
    }

    /// Save a successful outcome and build the notification to report.
    pub async fn deliver<D: FileDelivery>(
        &self,
        outcome: &DownloadOutcome,
        mode: DownloadMode,
        delivery: &D,
    ) -> Notification {
        match outcome {
            DownloadOutcome::Success { filename, bytes } => {
                match delivery.deliver(filename, bytes.clone()).await {
                    Ok(path) => {
                        info!(path = %path.display(), "Saved download");
                        Notification::success(mode)
                    }
                    Err(e) => {
                        error!(error = %e, filename = %filename, "Failed to save download");
                        Notification::error(e.user_message())
                    }
                }
            }
            DownloadOutcome::Failure { message } => Notification::error(message.clone()),
        }
    }

    /// Run one download from raw input to settled state.
    ///
    /// Validation errors and a busy orchestrator are returned as `Err` before
    /// anything is sent. Every other failure ends as a `Failure` outcome with
    /// exactly one error notification.
    pub async fn run<D, N>(
        &self,
        orchestrator: &mut Orchestrator,
        input: &DownloadInput,
        delivery: &D,
        notifier: &N,
    ) -> Result<DownloadOutcome, AppError>
    where
        D: FileDelivery,
        N: Notifier,
    {
        let request = orchestrator.begin(&input.sources, input.format, &input.quality)?;
        let mode = request.mode();

        let sent = {
            let mut ticker =
                ProgressTicker::start(self.config.tick_interval, ProgressEstimator::new());
            let send = self.send(&request);
            tokio::pin!(send);

            let sent = loop {
                tokio::select! {
                    sent = &mut send => break sent,
                    _ = ticker.tick() => {
                        orchestrator.advance(ticker.estimator_mut());
                        if let Some(progress) = orchestrator.progress() {
                            notifier.progress_changed(progress);
                        }
                    }
                }
            };
            ticker.stop();
            sent
        };
        orchestrator.response_received();
        if let Some(progress) = orchestrator.progress() {
            notifier.progress_changed(progress);
        }

        let resolved = match sent {
            Ok(response) => resolve(response, &request).await,
            Err(e) => Err(e),
        };
        let outcome = orchestrator.conclude(resolved);

        let notification = self.deliver(&outcome, mode, delivery).await;
        notifier.notify(notification);
        orchestrator.start_settling();

        tokio::time::sleep(self.config.settle_delay).await;
        orchestrator.settle();

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::domain::{LifecycleStatus, NotificationKind, ValidationError};
    use mockito::Matcher;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct RecordingDelivery {
        saved: Mutex<Vec<(String, Bytes)>>,
    }

    impl FileDelivery for RecordingDelivery {
        async fn deliver(&self, filename: &str, bytes: Bytes) -> Result<PathBuf, AppError> {
            self.saved.lock().unwrap().push((filename.to_string(), bytes));
            Ok(PathBuf::from(filename))
        }
    }

    struct FailingDelivery;

    impl FileDelivery for FailingDelivery {
        async fn deliver(&self, _filename: &str, _bytes: Bytes) -> Result<PathBuf, AppError> {
            Err(AppError::SaveCancelled)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notifications: Mutex<Vec<Notification>>,
        progress: Mutex<Vec<f32>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }

        fn progress_changed(&self, progress: f32) {
            self.progress.lock().unwrap().push(progress);
        }
    }

    /// Progress reported by a run that waited several ticks for its answer.
    fn assert_estimated_then_complete(progress: &[f32]) {
        let (last, estimates) = progress.split_last().unwrap();
        assert_eq!(*last, 100.0);
        assert!(estimates.len() >= 2, "too few ticks: {:?}", progress);
        assert!(estimates.iter().all(|p| *p > 0.0 && *p < 90.0));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    }

    fn coordinator(server: &mockito::Server) -> DownloadCoordinator {
        DownloadCoordinator::new(
            ApiClient::new(ApiConfig::new(format!("{}/api/download", server.url()))),
            SessionConfig {
                tick_interval: Duration::from_millis(5),
                settle_delay: Duration::from_millis(30),
            },
        )
    }

    fn input(sources: &str, format: MediaFormat, quality: &str) -> DownloadInput {
        DownloadInput {
            sources: sources.to_string(),
            format,
            quality: quality.to_string(),
        }
    }

    fn field(name: &str, value: &str) -> Matcher {
        Matcher::Regex(format!(r#"name="{}"\s+{}\s"#, name, regex::escape(value)))
    }

    #[tokio::test]
    async fn test_batch_success_saves_and_notifies_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/download/batch")
            .match_body(Matcher::AllOf(vec![
                field("url_0", "https://a"),
                field("url_1", "https://b"),
                field("format", "mp4"),
                field("quality", "720p"),
            ]))
            .with_status(200)
            .with_body("zipdata")
            .expect(1)
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        let outcome = coordinator
            .run(
                &mut orchestrator,
                &input("https://a, https://b", MediaFormat::Mp4, "720p"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.is_success());

        let saved = delivery.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "youtube_mp4_batch.zip");
        assert_eq!(saved[0].1.as_ref(), b"zipdata");

        let notifications = notifier.notifications.lock().unwrap();
        assert_eq!(*notifications, vec![Notification::success(DownloadMode::Batch)]);

        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
        assert_eq!(orchestrator.progress(), None);
    }

    #[tokio::test]
    async fn test_single_success_uses_header_filename() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/download")
            .match_body(field("url", "https://youtu.be/x"))
            .with_status(200)
            .with_header("content-disposition", r#"attachment; filename="song.mp3""#)
            .with_body("id3")
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        coordinator
            .run(
                &mut orchestrator,
                &input(" https://youtu.be/x ,", MediaFormat::Mp3, "320kbps"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(delivery.saved.lock().unwrap()[0].0, "song.mp3");
        assert_eq!(
            notifier.notifications.lock().unwrap()[0],
            Notification::success(DownloadMode::Single)
        );
    }

    #[tokio::test]
    async fn test_server_error_reports_failure_without_saving() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download/batch")
            .with_status(500)
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        let started = Instant::now();
        let outcome = coordinator
            .run(
                &mut orchestrator,
                &input("https://a, https://b", MediaFormat::Mp4, "720p"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert!(delivery.saved.lock().unwrap().is_empty());

        let notifications = notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(
            notifications[0].message,
            "Failed to download. Please try again later."
        );

        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
        assert!(started.elapsed() >= coordinator.config().settle_delay);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        for raw in ["", " ", ",,", " , , "] {
            let err = coordinator
                .run(
                    &mut orchestrator,
                    &input(raw, MediaFormat::Mp4, "720p"),
                    &delivery,
                    &notifier,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let err = coordinator
            .run(
                &mut orchestrator,
                &input("https://a", MediaFormat::Mp4, ""),
                &delivery,
                &notifier,
            )
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Validation(ValidationError::MissingQuality));

        mock.assert_async().await;
        assert!(notifier.notifications.lock().unwrap().is_empty());
        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
    }

    #[tokio::test]
    async fn test_transport_error_is_reported_as_failure() {
        let coordinator = DownloadCoordinator::new(
            ApiClient::new(ApiConfig::new("http://127.0.0.1:1/api/download")),
            SessionConfig {
                tick_interval: Duration::from_millis(5),
                settle_delay: Duration::from_millis(1),
            },
        );
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        let outcome = coordinator
            .run(
                &mut orchestrator,
                &input("https://a", MediaFormat::Mp4, "720p"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert!(delivery.saved.lock().unwrap().is_empty());
        assert_eq!(notifier.notifications.lock().unwrap().len(), 1);
        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_save_replaces_success_notification() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download")
            .with_status(200)
            .with_body("data")
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let notifier = RecordingNotifier::default();

        coordinator
            .run(
                &mut orchestrator,
                &input("https://a", MediaFormat::Mp4, "720p"),
                &FailingDelivery,
                &notifier,
            )
            .await
            .unwrap();

        let notifications = notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_success_ticks_before_completing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download")
            .with_status(200)
            .with_body_from_request(|_| {
                std::thread::sleep(Duration::from_millis(120));
                b"data".to_vec()
            })
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        let outcome = coordinator
            .run(
                &mut orchestrator,
                &input("https://a", MediaFormat::Mp4, "720p"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_estimated_then_complete(&notifier.progress.lock().unwrap());

        // the ticker is gone once the run returns
        let reported = notifier.progress.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(notifier.progress.lock().unwrap().len(), reported);
        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_server_error_ticks_before_completing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download/batch")
            .with_status(500)
            .with_body_from_request(|_| {
                std::thread::sleep(Duration::from_millis(120));
                Vec::new()
            })
            .create_async()
            .await;

        let coordinator = coordinator(&server);
        let mut orchestrator = Orchestrator::new();
        let delivery = RecordingDelivery::default();
        let notifier = RecordingNotifier::default();

        let outcome = coordinator
            .run(
                &mut orchestrator,
                &input("https://a, https://b", MediaFormat::Mp4, "720p"),
                &delivery,
                &notifier,
            )
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert!(delivery.saved.lock().unwrap().is_empty());
        assert_estimated_then_complete(&notifier.progress.lock().unwrap());
        assert_eq!(notifier.notifications.lock().unwrap().len(), 1);
        assert_eq!(orchestrator.status(), LifecycleStatus::Idle);
    }

    #[tokio::test]
    async fn test_directory_delivery_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = DirectoryDelivery::new(dir.path());

        let path = delivery
            .deliver("clip.mp4", Bytes::from_static(b"frames"))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("clip.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"frames");
    }
}

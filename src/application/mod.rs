pub mod download_coordinator;
pub mod orchestrator;
pub mod progress;
pub mod response_resolver;

pub use download_coordinator::{
    DirectoryDelivery, DownloadCoordinator, DownloadInput, FileDelivery, Notifier,
    SaveDialogDelivery,
};
pub use orchestrator::{Orchestrator, SessionConfig};
pub use progress::{ProgressEstimator, ProgressTicker};

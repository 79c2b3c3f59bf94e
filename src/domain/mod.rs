pub mod error;
pub mod input;
pub mod model;

pub use error::{AppError, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use input::{normalize_sources, validate_quality};
pub use model::{
    DownloadMode, DownloadOutcome, DownloadRequest, LifecycleStatus, MediaFormat, Notification,
    NotificationKind, ResolvedDownload,
};

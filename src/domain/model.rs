use std::fmt;

use bytes::Bytes;

const FALLBACK_PREFIX: &str = "youtube";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    /// Audio only
    Mp3,
    #[default]
    Mp4,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Mp4, MediaFormat::Mp3];

    /// Value sent in the `format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Mp3 => write!(f, "MP3 (audio)"),
            MediaFormat::Mp4 => write!(f, "MP4 (video)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Single,
    Batch,
}

/// One download invocation, fixed once dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadRequest {
    Single {
        source: String,
        format: MediaFormat,
        quality: String,
    },
    Batch {
        sources: Vec<String>,
        format: MediaFormat,
        quality: String,
    },
}

impl DownloadRequest {
    /// Returns `None` when `sources` is empty.
    pub fn new(mut sources: Vec<String>, format: MediaFormat, quality: String) -> Option<Self> {
        match sources.len() {
            0 => None,
            1 => Some(DownloadRequest::Single {
                source: sources.pop()?,
                format,
                quality,
            }),
            _ => Some(DownloadRequest::Batch {
                sources,
                format,
                quality,
            }),
        }
    }

    pub fn mode(&self) -> DownloadMode {
        match self {
            DownloadRequest::Single { .. } => DownloadMode::Single,
            DownloadRequest::Batch { .. } => DownloadMode::Batch,
        }
    }

    pub fn format(&self) -> MediaFormat {
        match self {
            DownloadRequest::Single { format, .. } | DownloadRequest::Batch { format, .. } => {
                *format
            }
        }
    }

    pub fn quality(&self) -> &str {
        match self {
            DownloadRequest::Single { quality, .. } | DownloadRequest::Batch { quality, .. } => {
                quality
            }
        }
    }

    pub fn sources(&self) -> &[String] {
        match self {
            DownloadRequest::Single { source, .. } => std::slice::from_ref(source),
            DownloadRequest::Batch { sources, .. } => sources,
        }
    }

    /// Name used when the response carries no usable filename.
    pub fn fallback_filename(&self) -> String {
        let format = self.format().as_str();
        match self.mode() {
            DownloadMode::Single => format!("{}_{}.{}", FALLBACK_PREFIX, format, format),
            DownloadMode::Batch => format!("{}_{}_batch.zip", FALLBACK_PREFIX, format),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { filename: String, bytes: Bytes },
    Failure { message: String },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleStatus {
    #[default]
    Idle,
    InFlight,
    Resolving,
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(mode: DownloadMode) -> Self {
        let message = match mode {
            DownloadMode::Single => "Download successful!",
            DownloadMode::Batch => "Batch download successful!",
        };
        Self {
            kind: NotificationKind::Success,
            message: message.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

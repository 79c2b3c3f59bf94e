use iced::{
    widget::{button, column, pick_list, progress_bar, row, text, text_input, Space},
    Element, Length,
};
use yt_downloader::application::Orchestrator;
use yt_downloader::domain::{MediaFormat, Notification, NotificationKind};

/// Qualities offered for a format, best first.
pub fn quality_options(format: MediaFormat) -> Vec<String> {
    let options: &[&str] = match format {
        MediaFormat::Mp4 => &["1080p", "720p", "480p", "360p"],
        MediaFormat::Mp3 => &["320kbps", "256kbps", "192kbps", "128kbps"],
    };
    options.iter().map(|q| q.to_string()).collect()
}

/// Main view state
pub struct DownloadView {
    pub sources: String,
    pub format: MediaFormat,
    pub quality: Option<String>,
    pub status_message: String,
    pub notification: Option<Notification>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            sources: String::new(),
            format: MediaFormat::default(),
            quality: None,
            status_message: "Paste YouTube URLs (comma separated for multiple downloads)"
                .to_string(),
            notification: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    SourcesChanged(String),
    FormatSelected(MediaFormat),
    QualitySelected(String),
    DownloadPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::SourcesChanged(sources) => {
                self.sources = sources;
            }
            DownloadMessage::FormatSelected(format) => {
                if self.format != format {
                    self.format = format;
                    // qualities differ per format
                    self.quality = None;
                }
            }
            DownloadMessage::QualitySelected(quality) => {
                self.quality = Some(quality);
            }
            DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    /// The button needs input and an idle orchestrator.
    pub fn can_download(&self, orchestrator: &Orchestrator) -> bool {
        !self.sources.is_empty() && self.quality.is_some() && !orchestrator.is_busy()
    }

    pub fn view<'a>(&'a self, orchestrator: &'a Orchestrator) -> Element<'a, DownloadMessage> {
        let mut content = column![
            text("YT Downloader").size(32),
            text("Download YouTube videos in MP4 or MP3 format").size(14),
            Space::new().height(Length::Fixed(20.0)),
            text("YouTube URLs:").size(16),
            text_input(
                "Paste YouTube URLs (comma separated for multiple downloads)",
                &self.sources
            )
            .on_input(DownloadMessage::SourcesChanged)
            .padding(10),
        ]
        .padding(20)
        .spacing(10);

        if let Some(error) = orchestrator.input_error() {
            content = content.push(text(error).size(14).style(text::danger));
        }

        content = content.push(
            row![
                pick_list(
                    &MediaFormat::ALL[..],
                    Some(self.format),
                    DownloadMessage::FormatSelected
                )
                .padding(10),
                pick_list(
                    quality_options(self.format),
                    self.quality.clone(),
                    DownloadMessage::QualitySelected
                )
                .placeholder("Select quality")
                .padding(10),
            ]
            .spacing(10),
        );

        if let Some(progress) = orchestrator.progress() {
            content = content
                .push(text(format!("Downloading... {}%", progress.round() as u32)).size(14))
                .push(progress_bar(0.0..=100.0, progress));
        }

        let label = if orchestrator.is_busy() {
            "Downloading..."
        } else {
            match self.format {
                MediaFormat::Mp3 => "Download MP3",
                MediaFormat::Mp4 => "Download MP4",
            }
        };

        content = content.push(
            button(label)
                .on_press_maybe(
                    self.can_download(orchestrator)
                        .then_some(DownloadMessage::DownloadPressed),
                )
                .padding([10, 20]),
        );

        if let Some(notification) = &self.notification {
            let line = text(&notification.message).size(14);
            content = content.push(match notification.kind {
                NotificationKind::Success => line.style(text::success),
                NotificationKind::Error => line.style(text::danger),
            });
        }

        content
            .push(text(&self.status_message).size(12))
            .into()
    }
}

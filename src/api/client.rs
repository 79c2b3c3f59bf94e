use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::ApiConfig;
use crate::domain::{AppError, DownloadRequest};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(StatusCode),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status(status) => AppError::Remote(status.as_u16()),
            ApiError::RequestError(e) => AppError::Transport(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Build the endpoint and multipart form for a request.
    ///
    /// Single downloads carry the source under `url`, batches under
    /// `url_0..url_{n-1}` in input order. Both add `format` and `quality`.
    fn build_form(&self, request: &DownloadRequest) -> (String, Form) {
        let (endpoint, form) = match request {
            DownloadRequest::Single { source, .. } => (
                self.config.single_endpoint(),
                Form::new().text("url", source.clone()),
            ),
            DownloadRequest::Batch { sources, .. } => (
                self.config.batch_endpoint(),
                sources
                    .iter()
                    .enumerate()
                    .fold(Form::new(), |form, (index, source)| {
                        form.text(format!("url_{}", index), source.clone())
                    }),
            ),
        };

        let form = form
            .text("format", request.format().as_str())
            .text("quality", request.quality().to_string());

        (endpoint, form)
    }

    /// Send one download request to the service.
    ///
    /// Returns the response untouched on a 2xx status so the body can be
    /// resolved by the caller.
    pub async fn send(&self, request: &DownloadRequest) -> Result<Response> {
        let (endpoint, form) = self.build_form(request);
        debug!(
            endpoint = %endpoint,
            mode = ?request.mode(),
            sources = request.sources().len(),
            "Sending download request"
        );

        let response = self.http.post(&endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %endpoint, status = %status, "Download request rejected");
            return Err(ApiError::Status(status));
        }

        Ok(response)
    }
}

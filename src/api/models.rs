/// Default location of the local conversion service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api/download";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint for single downloads. Batches go to `{base_url}/batch`.
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn single_endpoint(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    pub fn batch_endpoint(&self) -> String {
        format!("{}/batch", self.single_endpoint())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

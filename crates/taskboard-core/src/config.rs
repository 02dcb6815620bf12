//! Client Configuration

/// API root used when no override is compiled in
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Browser storage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

/// How long a failure notice stays on screen
pub const DEFAULT_ERROR_DISMISS_MS: u32 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Without trailing slash
    pub api_base_url: String,
    pub token_key: String,
    pub error_dismiss_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ClientConfig {
    /// Reads `TASKBOARD_API_URL` at compile time, since a wasm bundle has no
    /// process environment
    pub fn from_env() -> Self {
        Self::with_base_url(option_env!("TASKBOARD_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        Self {
            api_base_url: if trimmed.is_empty() { DEFAULT_API_URL.to_string() } else { trimmed.to_string() },
            token_key: TOKEN_STORAGE_KEY.to_string(),
            error_dismiss_ms: DEFAULT_ERROR_DISMISS_MS,
        }
    }

    /// Absolute URL for an API path such as `/stages/board/1`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("response parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no results for {0}")]
    Empty(String),
    #[error("background task failed: {0}")]
    Task(String),
}

#[derive(thiserror::Error, Debug)]
pub enum PrefsError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("preferences io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

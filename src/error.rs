use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} is set but empty")]
    Empty { key: &'static str },

    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure talking to the pretalx submissions/reviews service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("gave up after {limit} pages, last cursor was {url}")]
    PageLimit { limit: usize, url: String },

    #[error("refusing to follow cursor to another origin: {url}")]
    ForeignCursor { url: String },
}

/// Failure from the generative-language service. Never aborts a page render.
#[derive(Error, Debug)]
pub enum JudgmentError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("prompt was blocked ({reason})")]
    BlockedPrompt { reason: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl JudgmentError {
    pub fn kind(&self) -> &'static str {
        match self {
            JudgmentError::Transport(_) => "TransportError",
            JudgmentError::Api { .. } => "ApiError",
            JudgmentError::BlockedPrompt { .. } => "BlockedPrompt",
            JudgmentError::EmptyResponse => "EmptyResponse",
            JudgmentError::Decode(_) => "DecodeError",
        }
    }

    /// Inline label shown in place of the judgment, `<ErrorKind>: <message>`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

/// Errors that end a request. Pages get an HTML error view, the API gets JSON.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid submission code {0:?}")]
    InvalidCode(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Fetch(FetchError::Status { status, .. })
                if *status == reqwest::StatusCode::NOT_FOUND =>
            {
                StatusCode::NOT_FOUND
            }
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidCode(_) => StatusCode::BAD_REQUEST,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wraps an [`AppError`] so it renders as a JSON body.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError(AppError::Fetch(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        tracing::error!("API request failed: {}", self.0);
        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

/// HTML error page, rendered without the template engine so a broken
/// template can still be reported.
pub fn error_page(title: &str, err: &AppError) -> Response {
    tracing::error!("Page render failed: {}", err);
    let body = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><p class=\"error\">{message}</p><p><a href=\"/\">Back to submissions</a></p></body></html>",
        title = tera::escape_html(title),
        message = tera::escape_html(&err.to_string()),
    );
    (err.status(), Html(body)).into_response()
}

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::transport::Response;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain {0:?} is invalid: {1}")]
    Invalid(String, String),
    #[error("domain {0:?} doesn't have a root")]
    MissingRoot(String),
}

/// Error returned by the Hetzner DNS API, classified by status code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("400 Bad Request: {body}")]
    BadRequest { body: String },
    #[error("401 Unauthorized: {url}")]
    Unauthorized { url: Url },
    #[error("403 Forbidden: {body}")]
    Forbidden { body: String },
    #[error("404 Not Found: {body}")]
    NotFound { body: String },
    /// The API rejected the request's content headers.
    ///
    /// This means the client itself built a malformed request and retrying
    /// can't help. See [ApiError::is_fatal].
    #[error("406 Not Acceptable: maybe content headers were not set properly ({url})")]
    NotAcceptable { url: Url },
    #[error("422 Unprocessable Entity: {body}")]
    UnprocessableEntity { body: String },
    #[error("unknown error: {status} {body}")]
    Unknown { status: StatusCode, body: String },
    #[error("unknown error: unable to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Classifies a response that didn't have the expected success status.
    pub(crate) fn from_response(url: &Url, resp: Response) -> Self {
        let Response { status, body } = resp;
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest { body },
            StatusCode::UNAUTHORIZED => Self::Unauthorized { url: url.clone() },
            StatusCode::FORBIDDEN => Self::Forbidden { body },
            StatusCode::NOT_FOUND => Self::NotFound { body },
            StatusCode::NOT_ACCEPTABLE => Self::NotAcceptable { url: url.clone() },
            StatusCode::UNPROCESSABLE_ENTITY => Self::UnprocessableEntity { body },
            status => Self::Unknown { status, body },
        }
    }

    /// Whether the error points at a defect in this client rather than at
    /// something the caller can correct.
    ///
    /// Only [ApiError::NotAcceptable] is fatal. Whether to abort or to
    /// propagate it is left to the application.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotAcceptable { .. })
    }

    /// The status code the error was classified from, if any.
    pub fn status(&self) -> Option<StatusCode> {
        Some(match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unknown { status, .. } => *status,
            Self::Decode(_) => return None,
        })
    }
}

/// Failure to get any response out of the transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error(transparent)]
    Reqwest(reqwest::Error),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout(value)
        } else {
            Self::Reqwest(value)
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Hetzner(#[from] ApiError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    #[error("zone id is empty")]
    EmptyZoneId,
    #[error("zone id {0:?} can't be used as a path segment")]
    InvalidZoneId(String),
    #[error("request was cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("unable to spawn request thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("transport stopped without returning a response")]
    TransportAborted,
}

impl ClientError {
    /// Whether the error is a fatal API error, see [ApiError::is_fatal].
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Hetzner(e) if e.is_fatal())
    }
}

#[derive(Error, Debug)]
pub enum ClientBuilderError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("token contains characters that aren't allowed in a header")]
    InvalidToken,
    #[error("endpoint {0} can't be used as a base URL")]
    InvalidEndpoint(Url),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

use std::fmt;

/// Custom error type for Prefect API and provider operations
#[derive(Debug)]
pub enum PrefectError {
    /// HTTP transport failed (connection, TLS, timeout)
    Http(reqwest::Error),
    /// Request could not be constructed (malformed method or URL)
    Request(String),
    /// API responded with a status code outside the allow-list
    Api {
        status: u16,
        status_line: String,
        body: String,
    },
    /// Request body could not be encoded as JSON
    Encode(String),
    /// Response body could not be decoded from JSON
    Decode(String),
    /// Provider or client configuration error
    Config(String),
    /// Identifier or value parse error (UUID, import ID, JSON text)
    Parse(String),
    /// Another error with a short description of the failed operation
    Context {
        context: String,
        source: Box<PrefectError>,
    },
}

impl PrefectError {
    /// Wrap this error with a description of the operation that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        PrefectError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of the underlying API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PrefectError::Api { status, .. } => Some(*status),
            PrefectError::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the underlying API error is a 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl fmt::Display for PrefectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefectError::Http(e) => write!(f, "http error: {}", e),
            PrefectError::Request(msg) => write!(f, "error creating request: {}", msg),
            PrefectError::Api {
                status_line, body, ..
            } => write!(f, "status code={}, error={}", status_line, body),
            PrefectError::Encode(msg) => write!(f, "failed to encode body data: {}", msg),
            PrefectError::Decode(msg) => write!(f, "failed to decode response: {}", msg),
            PrefectError::Config(msg) => write!(f, "{}", msg),
            PrefectError::Parse(msg) => write!(f, "{}", msg),
            PrefectError::Context { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for PrefectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefectError::Http(e) => Some(e),
            PrefectError::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PrefectError {
    fn from(err: reqwest::Error) -> Self {
        PrefectError::Http(err)
    }
}

impl From<serde_json::Error> for PrefectError {
    fn from(err: serde_json::Error) -> Self {
        PrefectError::Decode(err.to_string())
    }
}

impl From<uuid::Error> for PrefectError {
    fn from(err: uuid::Error) -> Self {
        PrefectError::Parse(err.to_string())
    }
}

/// Result type alias for Prefect operations
pub type Result<T> = std::result::Result<T, PrefectError>;

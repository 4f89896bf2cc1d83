use thiserror::Error;

/// Failure to get any response out of the service
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// Main error type for labdesk
#[derive(Error, Debug)]
pub enum LabError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: TransportError,
    },

    #[error("{context}: {message}")]
    MalformedResponse { context: String, message: String },

    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    #[error("General error: {0}")]
    General(#[from] anyhow::Error),
}

impl LabError {
    /// Create a local validation error; nothing has been sent yet
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an error reported by the service itself
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn transport(context: impl Into<String>, source: impl Into<TransportError>) -> Self {
        Self::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a file I/O error
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    /// True when the error was raised before any request went out
    pub fn is_local(&self) -> bool {
        matches!(self, LabError::Validation { .. })
    }

    /// Check if error is recoverable (the session can keep going)
    pub fn is_recoverable(&self) -> bool {
        match self {
            LabError::Validation { .. } => true,
            LabError::Remote { .. } => true,
            LabError::Transport { .. } => true,
            LabError::MalformedResponse { .. } => true,
            LabError::FileIO { .. } => true,
            LabError::Configuration { .. } => false,
            LabError::Terminal { .. } => false,
            LabError::General(_) => true,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LabError::Validation { message } => message.clone(),
            LabError::Remote { message, .. } => message.clone(),
            LabError::Transport { context, source } => format!("{}: {}", context, source),
            LabError::MalformedResponse { context, message } => {
                format!("{}: {}", context, message)
            }
            LabError::FileIO { path, source } => {
                format!("Could not access {}: {}", path, source)
            }
            LabError::Configuration { message } => {
                format!("Configuration problem: {}", message)
            }
            LabError::Terminal { message } => {
                format!("Terminal problem: {}", message)
            }
            LabError::General(err) => err.to_string(),
        }
    }
}

impl From<std::io::Error> for LabError {
    fn from(err: std::io::Error) -> Self {
        LabError::FileIO {
            path: "unknown".to_string(),
            source: err,
        }
    }
}

/// Result type alias for labdesk operations
pub type LabResult<T> = Result<T, LabError>;

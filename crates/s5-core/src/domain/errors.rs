use std::path::PathBuf;

pub type S5Result<T> = Result<T, S5Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S5ErrorCategory {
    Success,
    FormatError,
    IoSystemError,
    ComputationError,
    StateError,
}

impl S5ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::FormatError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::StateError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::FormatError => "FormatError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::StateError => "StateError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum S5Error {
    #[error("{context}: {message}")]
    Format { context: String, message: String },
    #[error("{message}")]
    State { message: String },
    #[error("'{key}' not found in {context}")]
    NotFound { key: String, context: String },
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid profile input: {message}")]
    InvalidProfile { message: String },
    #[error(
        "mean correction did not converge after {iterations} iterations (deviation {deviation:.3e})"
    )]
    NonConvergence {
        iterations: usize,
        deviation: f64,
        best_effort: Vec<f64>,
    },
}

impl S5Error {
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    pub fn not_found(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            context: context.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile {
            message: message.into(),
        }
    }

    pub const fn category(&self) -> S5ErrorCategory {
        match self {
            Self::Format { .. } | Self::NotFound { .. } | Self::InvalidProfile { .. } => {
                S5ErrorCategory::FormatError
            }
            Self::State { .. } => S5ErrorCategory::StateError,
            Self::Io { .. } => S5ErrorCategory::IoSystemError,
            Self::NonConvergence { .. } => S5ErrorCategory::ComputationError,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.category().as_str(), self)
    }
}

pub mod errors;

pub use errors::{S5Error, S5ErrorCategory, S5Result};

use std::fmt::{Display, Formatter};
use tracing::warn;

/// Non-fatal conditions raised while reading, writing or shaping data.
///
/// Processing continues with best-effort defaults; callers inspect the
/// returned list instead of a process-wide warning channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `ni * nj * nk` does not match the table row count.
    ZoneMismatch,
    /// Weather zone `nj` does not match the number of distinct distances.
    DistanceAxisMismatch,
    /// Weather zone `ni` does not match the number of distinct time stamps.
    TimeAxisMismatch,
    /// The variation residual did not integrate to zero at the requested precision.
    ResidualNotZero,
}

impl DiagnosticCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZoneMismatch => "ZONE_MISMATCH",
            Self::DistanceAxisMismatch => "DISTANCE_AXIS_MISMATCH",
            Self::TimeAxisMismatch => "TIME_AXIS_MISMATCH",
            Self::ResidualNotZero => "RESIDUAL_NOT_ZERO",
        }
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    /// Builds a diagnostic and mirrors it to the `tracing` warn level.
    pub fn emit(code: DiagnosticCode, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(code = %code, "{}", message);
        Self { code, message }
    }

    pub fn diagnostic_line(&self) -> String {
        format!("WARNING: [{}] {}", self.code, self.message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DiagnosticCode};

    #[test]
    fn diagnostic_renders_code_and_message() {
        let diagnostic = Diagnostic::emit(DiagnosticCode::ZoneMismatch, "Zone detail mismatch");
        assert_eq!(
            diagnostic.diagnostic_line(),
            "WARNING: [ZONE_MISMATCH] Zone detail mismatch"
        );
        assert_eq!(diagnostic.to_string(), "[ZONE_MISMATCH] Zone detail mismatch");
    }
}

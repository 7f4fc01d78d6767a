/// Errors surfaced by the core parser crate.
///
/// `PredictionRejected` intentionally has no variant here: the inference
/// driver substitutes `Reduce(0)` for a rejected prediction internally and
/// never lets that condition escape to a caller (spec.md section 7).
#[derive(thiserror::Error, Debug)]
pub enum NahwError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("parser diverged after {steps} actions without reaching a stop state")]
    ParseDiverged { steps: u32 },

    #[error("malformed graph text at line {line}: {message}")]
    FormatError { message: String, line: usize },
}

impl NahwError {
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        NahwError::InvariantViolation(msg.into())
    }

    pub fn format_error<S: Into<String>>(msg: S, line: usize) -> Self {
        NahwError::FormatError { message: msg.into(), line }
    }
}

pub type Result<T> = std::result::Result<T, NahwError>;

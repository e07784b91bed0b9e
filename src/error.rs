use thiserror::Error;

#[derive(Error, Debug)]
/// Rendering error
pub enum CsvError {
    /// The target cannot be turned into records (unknown shape, non-scalar
    /// field, mismatched value count, empty translation key).
    #[error("InvalidInput: {0}")]
    InvalidInput(String),

    /// A date or numeric pattern is malformed or does not apply to the
    /// value it was asked to format.
    #[error("Format of field `{field}` with pattern `{pattern}`: {reason}")]
    Format {
        field: String,
        pattern: String,
        reason: String,
    },

    #[error("Writer: {0}")]
    Io(#[from] std::io::Error),
}

impl CsvError {
    pub(crate) fn format(field: &str, pattern: &str, reason: impl Into<String>) -> Self {
        CsvError::Format {
            field: field.to_string(),
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error raised by the pattern compilers before a field name is known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PatternError(pub String);

impl PatternError {
    pub(crate) fn into_csv_error(self, field: &str, pattern: &str) -> CsvError {
        CsvError::format(field, pattern, self.0)
    }
}

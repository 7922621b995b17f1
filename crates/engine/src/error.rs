use std::fmt;

/// File-level and configuration failures. Any of these means the run produced
/// no usable results; row and product problems are reported as warnings instead.
#[derive(Debug, Clone, PartialEq)]
pub enum RestockError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero weeks, blank column name, etc.).
    ConfigValidation(String),
    /// The tabular reader could not decode the file.
    Read { source: String, message: String },
    /// The file has no header row at all.
    EmptyFile { source: String },
    /// One or more required columns are absent from the header row.
    MissingColumns { source: String, columns: Vec<String> },
    /// Every data row of the sales file was rejected.
    NoValidTransactions { source: String, skipped: usize },
}

impl RestockError {
    /// True for failures caused by the shape of an input file rather than by
    /// configuration or by the reader.
    pub fn is_input_shape(&self) -> bool {
        matches!(
            self,
            Self::EmptyFile { .. } | Self::MissingColumns { .. } | Self::NoValidTransactions { .. }
        )
    }
}

impl fmt::Display for RestockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Read { source, message } => write!(f, "cannot read '{source}': {message}"),
            Self::EmptyFile { source } => write!(f, "'{source}' is empty or has no header row"),
            Self::MissingColumns { source, columns } => write!(
                f,
                "'{source}' is missing required column(s): {}",
                columns.join(", ")
            ),
            Self::NoValidTransactions { source, skipped } => write!(
                f,
                "no valid transactions in '{source}' ({skipped} row(s) rejected)"
            ),
        }
    }
}

impl std::error::Error for RestockError {}

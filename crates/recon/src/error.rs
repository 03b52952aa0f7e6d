use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank column name, empty reversal set, etc.).
    ConfigValidation(String),
    /// A required input (matera, dock, depara) has no data at all.
    EmptyInput(String),
    /// Required column absent after loading. Fatal: aborts the run.
    MissingColumn { source: String, column: String },
    /// Banner scan found no anchor row in a processor export.
    MalformedAnchor { source: String },
    /// An amount cell could not be parsed. Fatal: a silently zeroed
    /// amount would corrupt aggregate totals.
    AmountParse { source: String, row: usize, value: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyInput(what) => write!(f, "no {what} input provided"),
            Self::MissingColumn { source, column } => {
                write!(f, "'{source}': missing expected column '{column}'")
            }
            Self::MalformedAnchor { source } => {
                write!(f, "'{source}': no anchor row found below the banner region")
            }
            Self::AmountParse { source, row, value } => {
                write!(f, "'{source}', data row {row}: cannot parse amount '{value}'")
            }
        }
    }
}

impl std::error::Error for ReconError {}

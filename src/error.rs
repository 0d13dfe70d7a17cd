use thiserror::Error;

/// The source file could not be turned into a complete table.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("line {line}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// A referenced column is absent from the table or has the wrong kind.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column '{0}' is not present in the table")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' cannot be used as a grouping key")]
    NotGroupable(String),
}

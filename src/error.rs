use std::path::PathBuf;

/// Fatal problems while reading the two input files.
///
/// Loading is all-or-nothing: any of these aborts startup and no report is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing required column `{column}`", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}, row {row}: missing value for `{column}`", .path.display())]
    MissingField {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("{}, row {row}: cannot parse `{column}` from {value:?}", .path.display())]
    InvalidField {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Bad user-supplied filter values (date bounds, month selector).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    Date(String),

    #[error("invalid month {0:?} (expected YYYY-MM)")]
    Month(String),
}

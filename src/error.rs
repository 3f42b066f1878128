//! Rich diagnostic error types for isgci-why.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum WhyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(why::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("trace store unavailable at {path}: {message}")]
    #[diagnostic(
        code(why::store::unavailable),
        help(
            "The trace database could not be opened. Run `why import` to create it, \
             point `--store` (or WHY_STORE) at an existing database, or make sure no \
             other process holds it open for writing."
        )
    )]
    Unavailable { path: String, message: String },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(why::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             This may indicate corruption. Re-import the trace export into a fresh database."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(why::store::serde),
        help(
            "Failed to serialize or deserialize a stored relation record. \
             The stored JSON does not match the expected layout. Re-import the export."
        )
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Log errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LogError {
    #[error("could not open the log file: {path}")]
    #[diagnostic(
        code(why::log::read),
        help("Check that the log file exists and is readable, or set `log_path` / WHY_LOG.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(why::config::no_home),
        help("Set the HOME environment variable or pass explicit paths with --config and --store.")
    )]
    NoHome,

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(why::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(why::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(
        code(why::config::serialize),
        help("Every configured path must be valid UTF-8 to be written as TOML.")
    )]
    Serialize { message: String },

    #[error("invalid value for {key}: \"{value}\"")]
    #[diagnostic(
        code(why::config::invalid_value),
        help("The override could not be parsed. Numeric settings take plain decimal integers.")
    )]
    InvalidValue { key: String, value: String },
}

// ---------------------------------------------------------------------------
// Import errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("failed to read export file: {path}")]
    #[diagnostic(
        code(why::import::read),
        help("Check that the export file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse export file {path}: {message}")]
    #[diagnostic(
        code(why::import::parse),
        help(
            "Trace exports are a JSON array of {{\"sub\", \"super\", \"type\", \"dependencies\"}} rows; \
             name exports are a JSON array of {{\"id\", \"name\"}} rows."
        )
    )]
    Parse { path: String, message: String },

    #[error("invalid dependency list for {sub} -> {sup}: {message}")]
    #[diagnostic(
        code(why::import::dependencies),
        help("The dependencies column must hold a JSON array of {{\"sub\", \"sup\"}} objects.")
    )]
    InvalidDependencies { sub: u32, sup: u32, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for functions returning isgci-why results.
pub type WhyResult<T> = std::result::Result<T, WhyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_why_error() {
        let err = StoreError::Unavailable {
            path: "trace.redb".into(),
            message: "missing".into(),
        };
        let why: WhyError = err.into();
        assert!(matches!(why, WhyError::Store(StoreError::Unavailable { .. })));
    }

    #[test]
    fn import_error_wraps_store_error() {
        let store_err = StoreError::Redb {
            message: "commit failed".into(),
        };
        let import_err: ImportError = store_err.into();
        assert!(matches!(import_err, ImportError::Store(StoreError::Redb { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = ImportError::InvalidDependencies {
            sub: 1,
            sup: 16,
            message: "expected array".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("1 -> 16"));
        assert!(msg.contains("expected array"));
    }
}

//! Error types for the surge staffing simulator
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - A client/server split used by the HTTP layer
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Persona errors (3xx)
    PersonaNotFound = 300,
    PersonaInvalid = 301,

    // Session errors (4xx)
    SessionNotFound = 400,
    InvalidBucket = 401,
    NothingToPin = 402,

    // Server errors (5xx)
    ServerBind = 500,
    ServerFailed = 501,
    InvalidRequest = 502,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Persona errors
            400..=499 => 40, // Session errors
            500..=599 => 50, // Server errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the simulator
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Persona Errors
    // ─────────────────────────────────────────────────────────────

    /// No definition exists for the requested persona id
    #[error("Persona not found: {name}")]
    PersonaNotFound { name: String },

    /// A persona definition exists but is malformed
    #[error("Persona {name} is invalid: {reason}")]
    PersonaInvalid { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────

    /// Unknown session id
    #[error("Unknown session: {session_id}")]
    SessionNotFound { session_id: String },

    /// Bucket name outside the fixed bucket set
    #[error("Invalid bucket '{bucket}'. Valid: {valid}")]
    InvalidBucket { bucket: String, valid: String },

    /// Pin requested before the session produced any reply
    #[error("Session {session_id} has no reply to pin yet")]
    NothingToPin { session_id: String },

    // ─────────────────────────────────────────────────────────────
    // Server Errors
    // ─────────────────────────────────────────────────────────────

    /// Could not bind the listen address
    #[error("Failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP server terminated with an error
    #[error("Server error: {0}")]
    Server(String),

    /// Request body or query string could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,
            Error::PersonaInvalid { .. } => ErrorCode::PersonaInvalid,

            Error::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Error::InvalidBucket { .. } => ErrorCode::InvalidBucket,
            Error::NothingToPin { .. } => ErrorCode::NothingToPin,

            Error::Bind { .. } => ErrorCode::ServerBind,
            Error::Server(_) => ErrorCode::ServerFailed,
            Error::InvalidRequest(_) => ErrorCode::InvalidRequest,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.is_not_found() || self.is_bad_request()
    }

    /// Unknown session or persona
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SessionNotFound { .. } | Error::PersonaNotFound { .. }
        )
    }

    /// Malformed request, or well-formed but semantically rejected
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Error::InvalidBucket { .. }
                | Error::NothingToPin { .. }
                | Error::InvalidRequest(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'surge-sim config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'surge-sim config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::PersonaNotFound { .. } => Some(
                "Valid personas: finance, clinical, operations (or 'auto' when chatting)."
            ),
            Error::PersonaInvalid { .. } => Some(
                "Each persona file needs [identity] role/name/temperament, [style], and at least one objective and constraint. Run 'surge-sim persona export' for a template."
            ),

            Error::SessionNotFound { .. } => Some(
                "Start a new session first (POST /session)."
            ),
            Error::InvalidBucket { .. } => Some(
                "Pin into one of: states, actions, transitions, rewards, constraints, uncertainties, tradeoffs."
            ),
            Error::NothingToPin { .. } => Some(
                "Ask a persona a question before pinning its answer."
            ),

            Error::InvalidRequest(_) => Some(
                "Send a JSON body (or query string) with every required field, e.g. session_id and message for /chat."
            ),

            Error::Bind { .. } => Some(
                "Another process may be using this port. Try --port with a different value."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a persona not found error
    pub fn persona_not_found(name: impl Into<String>) -> Self {
        Error::PersonaNotFound { name: name.into() }
    }

    /// Create a persona invalid error
    pub fn persona_invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PersonaInvalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a session not found error
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Error::SessionNotFound {
            session_id: session_id.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::PersonaNotFound.as_str(), "E300");
        assert_eq!(ErrorCode::SessionNotFound.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::PersonaInvalid.exit_code(), 30);
        assert_eq!(ErrorCode::InvalidBucket.exit_code(), 40);
        assert_eq!(ErrorCode::ServerBind.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_display() {
        let err = Error::config_not_found("/path/to/config.toml");
        assert!(err.to_string().contains("/path/to/config.toml"));

        let err = Error::session_not_found("abc123");
        assert_eq!(err.to_string(), "Unknown session: abc123");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::session_not_found("x").is_not_found());
        assert!(Error::persona_not_found("x").is_not_found());
        assert!(Error::InvalidBucket {
            bucket: "misc".into(),
            valid: "states".into()
        }
        .is_bad_request());
        assert!(Error::NothingToPin { session_id: "x".into() }.is_client_error());
        assert!(Error::InvalidRequest("missing field".into()).is_bad_request());
        assert_eq!(ErrorCode::InvalidRequest.as_str(), "E502");
        assert!(!Error::persona_invalid("finance", "empty").is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::InvalidBucket {
            bucket: "misc".into(),
            valid: String::new(),
        };
        assert!(err.suggestion().unwrap().contains("tradeoffs"));

        assert!(Error::Internal("x".into()).suggestion().is_none());
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::config_not_found("/test/config.toml");
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::persona_not_found("pharmacist");
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E300]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}

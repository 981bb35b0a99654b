//! Error types for spaces-core
//!
//! One error type for the whole domain layer. The four lifecycle errors
//! (`AuthenticationFailed`, `SpaceNotFound`, `SpaceAlreadyExists`,
//! `FileNotFound`) are raised by this crate after inspecting a backend
//! response; everything else a backend reports travels through unchanged as
//! [`Error::Service`] or [`Error::Network`].

use thiserror::Error;

/// Result type alias for spaces-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes a backend uses for a missing key or bucket
const NOT_FOUND_CODES: &[&str] = &["NotFound", "NoSuchKey", "NoSuchBucket"];

/// Error codes a backend uses for rejected credentials
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
];

/// Error codes a backend uses for a bucket name conflict
const CONFLICT_CODES: &[&str] = &["BucketAlreadyExists", "BucketAlreadyOwnedByYou"];

/// Error types for spaces-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Alias not found
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Alias already exists
    #[error("Alias already exists: {0}")]
    AliasExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend rejected the configured credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The named space does not exist
    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    /// A space with this name already exists
    #[error("Space already exists: {0}")]
    SpaceAlreadyExists(String),

    /// The named file does not exist in its space
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The space has no CORS configuration at all
    #[error("No CORS configuration: {0}")]
    NoCorsConfiguration(String),

    /// A presigned URL validity could not be interpreted
    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    /// Error response from the storage service, passed through as reported
    #[error("Service error ({code}): {message}")]
    Service {
        /// Service error code, e.g. `NoSuchKey`
        code: String,
        /// HTTP status of the response, when one was received
        status: Option<u16>,
        /// Human-readable message
        message: String,
    },

    /// Network error (dispatch failure, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Build a service error from its parts
    pub fn service(code: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Service {
            code: code.into(),
            status,
            message: message.into(),
        }
    }

    /// Whether the backend reported a missing key or bucket
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Service { code, status, .. } => {
                *status == Some(404) || NOT_FOUND_CODES.contains(&code.as_str())
            }
            Error::SpaceNotFound(_) | Error::FileNotFound(_) => true,
            _ => false,
        }
    }

    /// Whether the backend rejected the request's credentials
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::Service { code, status, .. } => {
                *status == Some(403) || AUTH_CODES.contains(&code.as_str())
            }
            Error::AuthenticationFailed(_) => true,
            _ => false,
        }
    }

    /// Whether the backend reported a bucket name conflict
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Service { code, status, .. } => {
                *status == Some(409) || CONFLICT_CODES.contains(&code.as_str())
            }
            Error::SpaceAlreadyExists(_) => true,
            _ => false,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) | Error::InvalidExpiry(_) => 2, // UsageError
            Error::Network(_) => 3,                                               // NetworkError
            Error::AliasNotFound(_) => 5,                                         // NotFound
            Error::AliasExists(_) => 6,                                           // Conflict
            e if e.is_auth_failure() => 4,                                        // AuthError
            e if e.is_not_found() => 5,                                           // NotFound
            e if e.is_conflict() => 6,                                            // Conflict
            _ => 1,                                                               // GeneralError
        }
    }
}

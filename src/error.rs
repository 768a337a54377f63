//! Error types for cfseeker
//!
//! All modules use `SeekerResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfseeker operations
pub type SeekerResult<T> = Result<T, SeekerError>;

/// Which step of an org -> space -> app name resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    Org,
    Space,
    App,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStage::Org => write!(f, "org"),
            LookupStage::Space => write!(f, "space"),
            LookupStage::App => write!(f, "app"),
        }
    }
}

/// Coarse error classification used at the API and CLI boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an invalid combination of identifying fields
    Input,
    /// An external API call failed
    Upstream,
    /// The lookup completed but the resource does not exist
    NotFound,
}

/// All errors that can occur in cfseeker
#[derive(Error, Debug)]
pub enum SeekerError {
    // Request errors
    #[error("{0}")]
    Input(String),

    // Resolution errors
    #[error("While looking up given {stage}: {source}")]
    Lookup {
        stage: LookupStage,
        #[source]
        source: Box<SeekerError>,
    },

    #[error("Could not interpret `{0}` as IP address")]
    InvalidIp(String),

    #[error("Error when getting stats for app with GUID `{guid}` (Is the app running?): {source}")]
    AppStats {
        guid: String,
        #[source]
        source: Box<SeekerError>,
    },

    #[error("No stats found for app with GUID `{0}`")]
    NoInstances(String),

    #[error("Error fetching VMs for deployment `{deployment}`: {source}")]
    DeploymentFetch {
        deployment: String,
        #[source]
        source: Box<SeekerError>,
    },

    #[error("Could not find VM with given IP `{0}`")]
    VmNotFound(String),

    #[error("Could not look up GUID: {0} (does the GUID exist?)")]
    GuidNotFound(String),

    #[error("Unable to find {kind} `{name}`")]
    NotFound { kind: &'static str, name: String },

    // Upstream API errors
    #[error("HTTP request failed: {context}")]
    Http {
        context: String,
        #[source]
        source: ureq::Error,
    },

    #[error("{context} returned HTTP {status}: {body}")]
    HttpStatus {
        context: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {context}: {reason}")]
    BadResponse { context: String, reason: String },

    #[error("Token request to {endpoint} failed: {reason}")]
    Token { endpoint: String, reason: String },

    #[error("BOSH task {id} finished in state `{state}`: {result}")]
    TaskFailed {
        id: u64,
        state: String,
        result: String,
    },

    #[error("BOSH task {id} did not finish within {secs}s")]
    TaskTimeout { id: u64, secs: u64 },

    // Remote server errors
    #[error("Error given from API request ({status}): {message}")]
    Remote { status: u16, message: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Missing required configuration key `{0}`")]
    ConfigMissing(&'static str),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} requires --target (-t) to point at a cfseeker server")]
    TargetRequired(&'static str),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind server to {addr}: {source}")]
    ServerBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SeekerError {
    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an HTTP transport error with context
    pub fn http(context: impl Into<String>, source: ureq::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }

    /// Wrap an error with the resolution stage it happened in
    pub fn lookup(stage: LookupStage, source: SeekerError) -> Self {
        Self::Lookup {
            stage,
            source: Box::new(source),
        }
    }

    /// Create a not-found error for a named resource
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Classify the error for boundary layers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) | Self::TargetRequired(_) => ErrorKind::Input,
            Self::VmNotFound(_) | Self::GuidNotFound(_) => ErrorKind::NotFound,
            // Inside a `Lookup` wrapper this surfaces as an upstream stage failure.
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Lookup { .. } => ErrorKind::Upstream,
            Self::Remote { status, .. } => match status {
                400 => ErrorKind::Input,
                404 => ErrorKind::NotFound,
                _ => ErrorKind::Upstream,
            },
            _ => ErrorKind::Upstream,
        }
    }

    /// Check if the caller supplied bad input
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::Input
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing(_) => Some("Run: cfseeker config init, then edit the file"),
            Self::ConfigInvalid { .. } => Some("Run: cfseeker config show"),
            Self::TargetRequired(_) => Some("Pass --target https://<cfseeker-server>"),
            Self::VmNotFound(_) => Some("Check that bosh.deployments lists every CF deployment"),
            Self::Token { .. } => Some("Check the client credentials in your config"),
            _ => None,
        }
    }
}

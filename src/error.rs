use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// None of `--routes`, `--route-prefix` or `--middleware` was supplied
    NoSelectionCriteria,
    ManifestError { file: PathBuf, message: String },
    ConfigError(String),
    AuthenticationError { username: String, message: String },
    ExampleCallError { uri: String, message: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::NoSelectionCriteria => write!(
                f,
                "You must provide either a route prefix or a route or a middleware to generate the documentation."
            ),
            Error::ManifestError { file, message } => {
                write!(f, "Invalid route manifest {}: {}", file.display(), message)
            }
            Error::ConfigError(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::AuthenticationError { username, message } => {
                write!(f, "Unable to authenticate {}: {}", username, message)
            }
            Error::ExampleCallError { uri, message } => {
                write!(f, "Example call to {} failed: {}", uri, message)
            }
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::SerializationError(format!("template: {}", err))
    }
}

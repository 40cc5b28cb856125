use thiserror::Error;

/// Why a storage access failed. None of these reach the preference store's
/// callers; they are logged and replaced by the fallback value.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("failed to serialize value for '{key}'")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for '{key}' does not match the expected shape")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid shell configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid shell configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

use thiserror::Error;

/// Errors raised by [`crate::storage::BlobStorage`]
///
/// Every variant carries the object key so callers can surface it verbatim
/// to the user (chat reply or HTTP error body).
///
/// # Example
///
/// ```no_run
/// use polycore::StorageError;
///
/// fn report(err: StorageError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object store rejected or failed the request
    #[error("object store error for key '{key}': {source}")]
    ObjectStore {
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// The requested key does not exist in the bucket
    #[error("object '{key}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    /// Local file read/write failed
    #[error("local file error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Store could not be built from configuration
    #[error("blob storage configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_bucket_and_key() {
        let err = StorageError::NotFound {
            bucket: "images".to_string(),
            key: "cat.jpg".to_string(),
        };
        assert_eq!(err.to_string(), "object 'cat.jpg' not found in bucket 'images'");
    }
}

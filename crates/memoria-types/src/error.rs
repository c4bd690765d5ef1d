use thiserror::Error;

/// Errors from the key-value store and the repositories built on it.
///
/// Not-found is never an error here: lookups return `Option`, deletes return
/// `bool`. These variants cover the store being unreachable or holding bytes
/// that no longer decode.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error")]
    Connection,

    #[error("store query error: {0}")]
    Query(String),

    #[error("codec error: {0}")]
    Codec(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("disk I/O error".to_string());
        assert_eq!(err.to_string(), "store query error: disk I/O error");

        let err = StoreError::Codec("invalid JSON".to_string());
        assert_eq!(err.to_string(), "codec error: invalid JSON");
    }
}

//! Store errors.

use thiserror::Error;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity not found.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Entity id already taken.
    #[error("Entity already exists: {0}")]
    EntityExists(String),

    /// Duplicate (entity, threshold) pair.
    #[error("Trigger for {threshold} cycles already exists on {entity}")]
    TriggerExists { entity: String, threshold: u64 },

    /// No trigger at that threshold.
    #[error("Trigger for {threshold} cycles not found on {entity}")]
    TriggerNotFound { entity: String, threshold: u64 },

    /// Threshold must be positive.
    #[error("Trigger threshold must be greater than zero")]
    InvalidThreshold,

    /// Click delay out of range.
    #[error("Click delay {0}s out of range (0.1..=10)")]
    InvalidDelay(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::TriggerExists {
            entity: "pet1".to_string(),
            threshold: 30,
        };
        assert_eq!(err.to_string(), "Trigger for 30 cycles already exists on pet1");
        assert_eq!(
            StoreError::InvalidDelay(12.0).to_string(),
            "Click delay 12s out of range (0.1..=10)"
        );
    }

    #[test]
    fn test_from_serde() {
        let err: StoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}

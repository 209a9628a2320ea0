#![forbid(unsafe_code)]

//! Error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GestureError>;

/// Boxed error returned by fallible `can_start` predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by gesture configuration and lifecycle operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    #[error("max_touches ({max}) must be >= min_touches ({min})")]
    InvalidTouchBounds { min: usize, max: usize },

    #[error("min_touches must be >= 1")]
    ZeroMinTouches,

    #[error("threshold must be a finite, non-negative distance (got {threshold})")]
    InvalidThreshold { threshold: f64 },

    #[error("gesture name must not be empty")]
    EmptyName,

    #[error("gesture `{name}` was already destroyed")]
    AlreadyDestroyed { name: String },

    #[error("blocker was already destroyed")]
    BlockerDestroyed,
}

impl GestureError {
    /// Whether this is a configuration error (rejected at creation time).
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidTouchBounds { .. }
                | Self::ZeroMinTouches
                | Self::InvalidThreshold { .. }
                | Self::EmptyName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = GestureError::InvalidTouchBounds { min: 2, max: 1 };
        assert_eq!(e.to_string(), "max_touches (1) must be >= min_touches (2)");
        let e = GestureError::AlreadyDestroyed {
            name: "pan".into(),
        };
        assert_eq!(e.to_string(), "gesture `pan` was already destroyed");
    }

    #[test]
    fn config_classification() {
        assert!(GestureError::ZeroMinTouches.is_config());
        assert!(GestureError::InvalidThreshold { threshold: -1.0 }.is_config());
        assert!(!GestureError::BlockerDestroyed.is_config());
        assert!(
            !GestureError::AlreadyDestroyed {
                name: String::new()
            }
            .is_config()
        );
    }
}

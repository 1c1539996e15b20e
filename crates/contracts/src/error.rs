//! Layered error definitions
//!
//! Categorized by source: config / time arithmetic / clock role / capacity

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ClockError {
    // ===== Configuration Errors =====
    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Time Arithmetic Errors =====
    /// Tick rate must be a positive integer
    #[error("invalid tick rate: {tick_rate} (must be > 0)")]
    InvalidTickRate { tick_rate: u32 },

    /// Negative seconds passed where elapsed (unsigned) time is required
    #[error("negative elapsed time: {seconds}s")]
    NegativeTime { seconds: f64 },

    /// Arithmetic between two `TickTime` values of different rates
    #[error("tick rate mismatch: {left} vs {right}")]
    TickRateMismatch { left: u32, right: u32 },

    // ===== Clock Role Errors =====
    /// Follower-only operation invoked on an authority clock (or vice versa)
    #[error("clock role violation: {message}")]
    RoleViolation { message: String },

    // ===== Capacity Errors =====
    /// Snapshot buffer capacity must be positive
    #[error("invalid snapshot capacity: {capacity} (must be > 0)")]
    InvalidCapacity { capacity: usize },
}

impl ClockError {
    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create clock role violation error
    pub fn role_violation(message: impl Into<String>) -> Self {
        Self::RoleViolation {
            message: message.into(),
        }
    }
}

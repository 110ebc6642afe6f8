//! Error types for encode/recover/decode operations

use thiserror::Error;

/// Errors that can occur during erasure coding operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LeoError {
    /// A buffer length is zero or not a multiple of 64 bytes
    #[error("buffer size must be a multiple of 64 bytes")]
    InvalidSize,

    /// Share counts are outside the supported range
    #[error("invalid counts provided")]
    InvalidCounts,

    /// A function parameter was invalid
    #[error("a function parameter was invalid")]
    InvalidInput,

    /// Too many shares are missing for recovery to succeed
    #[error("not enough recovery data received")]
    NeedMoreData,

    /// Buffer counts exceed the field order
    #[error("buffer counts are too high")]
    TooMuchData,

    /// Required CPU features are unavailable
    #[error("platform is unsupported")]
    Platform,

    /// A transform was invoked before `init()`
    #[error("call init() first")]
    CallInitialize,

    /// Every chunk slot is absent, so no buffer size can be derived
    #[error("all buffers are empty")]
    AllBuffersEmpty,
}

/// Type alias for Result with LeoError
pub type Result<T> = std::result::Result<T, LeoError>;

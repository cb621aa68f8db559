use thiserror::Error;

/// Errors that can occur while configuring the encoder or encoding a frame.
///
/// Argument errors are reported as early as possible: range checks fail in the
/// configuration setters, cross-parameter checks fail when `encode` starts.
/// Once scan encoding has begun only `DestinationTooSmall` and `InternalError`
/// can occur.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpeglsError {
    #[error("Destination too small")]
    DestinationTooSmall,
    #[error("Invalid operation")]
    InvalidOperation,
    #[error("Color transform requires 8 or 16 bits per sample")]
    BitDepthForTransformNotSupported,
    #[error("Internal error")]
    InternalError,

    #[error("Invalid argument width")]
    InvalidArgumentWidth,
    #[error("Invalid argument height")]
    InvalidArgumentHeight,
    #[error("Invalid argument bits per sample")]
    InvalidArgumentBitsPerSample,
    #[error("Invalid argument component count")]
    InvalidArgumentComponentCount,
    #[error("Invalid argument component index")]
    InvalidArgumentComponentIndex,
    #[error("Invalid argument interleave mode")]
    InvalidArgumentInterleaveMode,
    #[error("Invalid argument near lossless")]
    InvalidArgumentNearLossless,
    #[error("Invalid argument JPEG-LS preset coding parameters")]
    InvalidArgumentJpeglsPcParameters,
    #[error("Invalid argument color transformation")]
    InvalidArgumentColorTransformation,
    #[error("Invalid argument SPIFF entry size")]
    InvalidArgumentSpiffEntrySize,
    #[error("Invalid argument SPIFF entry tag")]
    InvalidArgumentSpiffEntryTag,
    #[error("Invalid argument size")]
    InvalidArgumentSize,
    #[error("Invalid argument stride")]
    InvalidArgumentStride,
    #[error("Invalid argument mapping table ID")]
    InvalidArgumentMappingTableId,
    #[error("Invalid argument mapping entry size")]
    InvalidArgumentMappingEntrySize,
    #[error("Invalid argument application data ID")]
    InvalidArgumentApplicationDataId,
}

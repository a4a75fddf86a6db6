use thiserror::Error;

/// Errors raised while building or scheduling a sound.
///
/// None of these reach UI callers through the effect methods; they are
/// logged and the sound is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// The platform has no usable audio subsystem.
    #[error("audio context unavailable: {0}")]
    Unavailable(String),

    /// The audio subsystem rejected a node, parameter or schedule call.
    #[error("audio backend error: {0}")]
    Backend(String),

    /// A string did not name any known effect.
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    /// An offline render was asked for a rate outside what WebAudio accepts.
    #[error("unsupported sample rate {0} Hz")]
    UnsupportedSampleRate(u32),
}

/// Errors from the durable key-value storage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("failed to write key {key}: {reason}")]
    Write { key: String, reason: String },
}

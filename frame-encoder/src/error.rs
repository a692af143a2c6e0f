//! Error types shared by the encode pipeline.
//!
//! Every error here is fatal to a run: the driver never retries or resumes.

use std::fmt;

/// Rejected settings, detected before any resource is allocated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid frame size: {width}x{height}")]
    InvalidFrameSize { width: i64, height: i64 },

    #[error("Invalid keyframe interval value: {0}")]
    InvalidKeyframeInterval(i64),

    #[error("Unsupported codec: {0}")]
    UnknownCodec(String),

    #[error("Invalid time base: {num}/{den}")]
    InvalidTimeBase { num: i32, den: i32 },

    #[error("Invalid frame limit: 0 (omit the limit to encode the whole input)")]
    InvalidFrameLimit,
}

/// Failure reported by an encoder session.
///
/// `message` is the session's own error string; `detail` is the optional
/// extra text some encoders attach to the last failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", detail_line(.detail))]
pub struct EncoderError {
    pub message: String,
    pub detail: Option<String>,
}

impl EncoderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn detail_line(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!("\n    {}", d))
        .unwrap_or_default()
}

/// Encoder operation that failed, used to prefix the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderOp {
    Configure,
    Initialize,
    Encode,
    Drain,
    Destroy,
}

impl fmt::Display for EncoderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EncoderOp::Configure => "Failed to get default codec config",
            EncoderOp::Initialize => "Failed to initialize encoder",
            EncoderOp::Encode => "Failed to encode frame",
            EncoderOp::Drain => "Failed to retrieve encoded packet",
            EncoderOp::Destroy => "Failed to destroy codec",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{op}: {error}")]
    Encoder { op: EncoderOp, error: EncoderError },

    #[error("Failed to write compressed frame: {0}")]
    Write(std::io::Error),
}

impl PipelineError {
    pub fn encoder(op: EncoderOp) -> impl FnOnce(EncoderError) -> Self {
        move |error| PipelineError::Encoder { op, error }
    }
}

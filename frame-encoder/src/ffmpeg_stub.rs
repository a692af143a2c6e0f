//! Stand-in used when the crate is built without the `ffmpeg` feature.

use crate::{
    config::{CodecInfo, EncoderConfig, Usage},
    error::EncoderError,
    frame::PlanarFrame,
    packet::Packet,
    session::{EncodeFlags, EncoderBackend, EncoderSession},
};

fn unavailable() -> EncoderError {
    EncoderError::new("libavcodec support is not compiled in")
        .with_detail("rebuild with `--features ffmpeg`")
}

pub struct FfmpegBackend {
    codec: CodecInfo,
}

impl FfmpegBackend {
    pub fn new(codec: CodecInfo) -> Self {
        Self { codec }
    }
}

impl EncoderBackend for FfmpegBackend {
    type Session = FfmpegSession;

    fn name(&self) -> String {
        format!("{} (unavailable)", self.codec.encoder_name)
    }

    fn default_config(&self, _usage: Usage) -> Result<EncoderConfig, EncoderError> {
        Err(unavailable())
    }

    fn initialize(&self, _config: &EncoderConfig) -> Result<FfmpegSession, EncoderError> {
        Err(unavailable())
    }
}

/// Never constructed.
pub struct FfmpegSession(());

impl EncoderSession for FfmpegSession {
    fn submit(
        &mut self,
        _frame: Option<&PlanarFrame>,
        _pts: i64,
        _flags: EncodeFlags,
    ) -> Result<(), EncoderError> {
        Err(unavailable())
    }

    fn drain_next_packet(&mut self) -> Result<Option<Packet<'_>>, EncoderError> {
        Err(unavailable())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::{CodecRegistry, Settings};
    use crate::driver::{EncodePipeline, State};
    use crate::error::{EncoderOp, PipelineError};

    #[test]
    fn stub_fails_before_reading_input() {
        let codec = CodecRegistry::default().find("av1").unwrap().clone();
        let backend = FfmpegBackend::new(codec);
        let mut pipeline = EncodePipeline::new(&backend, Settings::default());

        let mut output = Vec::new();
        let err = pipeline
            .run(Cursor::new(vec![0u8; 1024]), &mut output)
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Encoder {
                op: EncoderOp::Configure,
                ..
            }
        ));
        assert_eq!(pipeline.state(), State::Error);
        assert!(output.is_empty());
    }
}

//! Encoder collaborator interfaces.
//!
//! The pipeline talks to a codec only through these traits, so any encoder
//! (libavcodec, a hardware SDK, a test double) can sit behind it.

use crate::config::{EncoderConfig, Usage};
use crate::error::EncoderError;
use crate::frame::PlanarFrame;
use crate::packet::Packet;

/// Per-submission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeFlags {
    pub force_keyframe: bool,
}

impl EncodeFlags {
    pub const NONE: EncodeFlags = EncodeFlags {
        force_keyframe: false,
    };
}

/// A codec interface: hands out default configurations and opens sessions.
pub trait EncoderBackend {
    type Session: EncoderSession;

    /// Human readable encoder name.
    fn name(&self) -> String;

    /// Encoder defaults for `usage`, to be adjusted before `initialize`.
    fn default_config(&self, usage: Usage) -> Result<EncoderConfig, EncoderError>;

    fn initialize(&self, config: &EncoderConfig) -> Result<Self::Session, EncoderError>;
}

/// A live, stateful encoder.
///
/// Synchronous push/pull protocol: after every `submit` the caller drains
/// packets with `drain_next_packet` until it returns `None`, and only then
/// submits again. `submit(None, ..)` asks the encoder to flush; it is repeated
/// until a drain right after it yields nothing.
pub trait EncoderSession {
    fn submit(
        &mut self,
        frame: Option<&PlanarFrame>,
        pts: i64,
        flags: EncodeFlags,
    ) -> Result<(), EncoderError>;

    fn drain_next_packet(&mut self) -> Result<Option<Packet<'_>>, EncoderError>;

    /// Releases the session. Dropping also releases it, without reporting errors.
    fn destroy(self) -> Result<(), EncoderError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

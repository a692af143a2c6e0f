/// Registers libavcodec components. Call once at startup before opening an
/// encoder; a no-op when built without the `ffmpeg` feature.
pub fn init() -> anyhow::Result<()> {
    #[cfg(feature = "ffmpeg")]
    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("ffmpeg_next init: {}", e))?;
    Ok(())
}

pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
#[cfg(not(feature = "ffmpeg"))]
#[path = "ffmpeg_stub.rs"]
pub mod ffmpeg;
pub mod frame;
pub mod keyframe;
pub mod packet;
pub mod session;
pub mod sink;

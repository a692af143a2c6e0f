use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use frame_encoder::{
    config::{self, CodecRegistry, Rational, Settings, Usage},
    error::ConfigError,
    frame::PixelLayout,
};

#[derive(Parser, Debug)]
#[command(
    name = "simple-encoder",
    version,
    about = "Encode raw 4:2:0 planar frames into a compressed bitstream",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Codec identifier, e.g. av1.
    pub codec: String,

    /// Frame width in pixels (positive, even).
    pub width: i64,

    /// Frame height in pixels (positive, even).
    pub height: i64,

    /// Raw input file: packed planar frames, no headers.
    pub infile: PathBuf,

    /// Output bitstream file.
    pub outfile: PathBuf,

    /// Force a keyframe every N frames (0 = encoder decides).
    pub keyframe_interval: i64,

    /// Error resilience flags handed to the encoder (0 = off).
    pub error_resilient: u32,

    /// Frames to encode (0 = whole input).
    pub frames: u64,

    /// Frame rate; the time base is 1/fps.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i32).range(1..))]
    pub fps: i32,

    /// Target bitrate in kbps.
    #[arg(long, default_value_t = 200)]
    pub bitrate: u32,

    /// Encoder usage profile.
    #[arg(long, value_enum, default_value_t = UsageArg::Realtime)]
    pub usage: UsageArg,

    /// Speed/quality trade-off, higher is faster.
    #[arg(long, default_value_t = 8)]
    pub cpu_used: u32,

    /// Constant quality level (0-63).
    #[arg(long, default_value_t = 45)]
    pub cq_level: u32,

    /// Input samples are 16-bit little-endian.
    #[arg(long)]
    pub high_bitdepth: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UsageArg {
    Good,
    Realtime,
    AllIntra,
}

impl From<UsageArg> for Usage {
    fn from(value: UsageArg) -> Self {
        match value {
            UsageArg::Good => Usage::GoodQuality,
            UsageArg::Realtime => Usage::Realtime,
            UsageArg::AllIntra => Usage::AllIntra,
        }
    }
}

impl Cli {
    /// Validates the arguments and turns them into encode settings.
    pub fn settings(&self, registry: &CodecRegistry) -> Result<Settings, ConfigError> {
        let codec = registry.find(&self.codec)?.clone();
        config::validate_frame_size(self.width, self.height)?;
        let keyframe_interval = config::keyframe_interval(self.keyframe_interval)?;
        let invalid_size = || ConfigError::InvalidFrameSize {
            width: self.width,
            height: self.height,
        };

        let settings = Settings {
            codec,
            width: u32::try_from(self.width).map_err(|_| invalid_size())?,
            height: u32::try_from(self.height).map_err(|_| invalid_size())?,
            time_base: Rational::new(1, self.fps),
            bitrate: self.bitrate,
            usage: self.usage.into(),
            error_resilient: self.error_resilient,
            cpu_used: self.cpu_used,
            cq_level: self.cq_level,
            layout: if self.high_bitdepth {
                PixelLayout::I420High
            } else {
                PixelLayout::I420
            },
            keyframe_interval,
            max_frames: config::max_frames(self.frames),
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["simple-encoder"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn positional_arguments_build_settings() {
        let cli = parse(&["av1", "416", "240", "in.yuv", "out.obu", "30", "0", "50"]);
        let settings = cli.settings(&CodecRegistry::default()).unwrap();
        assert_eq!(settings.codec.encoder_name, "libaom-av1");
        assert_eq!((settings.width, settings.height), (416, 240));
        assert_eq!(settings.keyframe_interval, 30);
        assert_eq!(settings.max_frames, Some(50));
        assert_eq!(settings.time_base, Rational::new(1, 30));
        assert_eq!(settings.bitrate, 200);
        assert_eq!(settings.cq_level, 45);
        assert_eq!(settings.layout, PixelLayout::I420);
    }

    #[test]
    fn optional_flags_override_defaults() {
        let cli = parse(&[
            "av1",
            "64",
            "64",
            "in.yuv",
            "out.obu",
            "0",
            "1",
            "0",
            "--fps",
            "25",
            "--usage",
            "good",
            "--high-bitdepth",
        ]);
        let settings = cli.settings(&CodecRegistry::default()).unwrap();
        assert_eq!(settings.time_base, Rational::new(1, 25));
        assert_eq!(settings.usage, Usage::GoodQuality);
        assert_eq!(settings.layout, PixelLayout::I420High);
        assert_eq!(settings.error_resilient, 1);
        assert_eq!(settings.max_frames, None);
    }

    #[test]
    fn negative_keyframe_interval_is_a_config_error() {
        let cli = parse(&["av1", "416", "240", "in.yuv", "out.obu", "-5", "0", "0"]);
        assert_eq!(
            cli.settings(&CodecRegistry::default()).unwrap_err(),
            ConfigError::InvalidKeyframeInterval(-5)
        );
    }

    #[test]
    fn odd_or_negative_size_is_a_config_error() {
        for (w, h) in [("415", "240"), ("-416", "240"), ("416", "0")] {
            let cli = parse(&["av1", w, h, "in.yuv", "out.obu", "0", "0", "0"]);
            assert!(matches!(
                cli.settings(&CodecRegistry::default()),
                Err(ConfigError::InvalidFrameSize { .. })
            ));
        }
    }

    #[test]
    fn unknown_codec_is_a_config_error() {
        let cli = parse(&["vp8", "416", "240", "in.yuv", "out.ivf", "0", "0", "0"]);
        assert_eq!(
            cli.settings(&CodecRegistry::default()).unwrap_err(),
            ConfigError::UnknownCodec("vp8".into())
        );
    }

    #[test]
    fn missing_arguments_fail_to_parse() {
        assert!(Cli::try_parse_from(["simple-encoder", "av1", "416"]).is_err());
    }
}

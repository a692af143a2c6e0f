use std::fmt;

use crate::error::ConfigError;
use crate::frame::PixelLayout;

/// AV1 fourcc, "AV01" little-endian.
pub const AV1_FOURCC: u32 = 0x3130_5641;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num <= 0 || self.den <= 0 {
            return Err(ConfigError::InvalidTimeBase {
                num: self.num,
                den: self.den,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Encoder usage profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Usage {
    GoodQuality,
    #[default]
    Realtime,
    AllIntra,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::GoodQuality => "good",
            Usage::Realtime => "realtime",
            Usage::AllIntra => "allintra",
        }
    }
}

/// Parameters handed to `EncoderBackend::initialize`.
///
/// Starts from the backend's defaults; the driver overwrites the fields it
/// controls and never touches it again once the session exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub width: u32,
    pub height: u32,
    pub time_base: Rational,
    /// Target bitrate in kbps.
    pub target_bitrate: u32,
    pub usage: Usage,
    pub error_resilient: u32,
    pub cpu_used: u32,
    pub cq_level: u32,
    pub layout: PixelLayout,
}

impl EncoderConfig {
    /// Defaults valid for material around QVGA.
    pub fn defaults(usage: Usage) -> Self {
        Self {
            width: 320,
            height: 240,
            time_base: Rational::new(1, 30),
            target_bitrate: 256,
            usage,
            error_resilient: 0,
            cpu_used: 0,
            cq_level: 32,
            layout: PixelLayout::I420,
        }
    }

    pub fn apply(&mut self, settings: &Settings) {
        self.width = settings.width;
        self.height = settings.height;
        self.time_base = settings.time_base;
        self.target_bitrate = settings.bitrate;
        self.usage = settings.usage;
        self.error_resilient = settings.error_resilient;
        self.cpu_used = settings.cpu_used;
        self.cq_level = settings.cq_level;
        self.layout = settings.layout;
    }
}

/// One entry of the codec table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    /// Identifier accepted on the command line.
    pub name: &'static str,
    pub fourcc: u32,
    /// libavcodec encoder implementing it.
    pub encoder_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: Vec<CodecInfo>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self {
            codecs: vec![CodecInfo {
                name: "av1",
                fourcc: AV1_FOURCC,
                encoder_name: "libaom-av1",
            }],
        }
    }
}

impl CodecRegistry {
    pub fn find(&self, name: &str) -> Result<&CodecInfo, ConfigError> {
        self.codecs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCodec(name.to_string()))
    }
}

/// Everything a single encode run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub codec: CodecInfo,
    pub width: u32,
    pub height: u32,
    pub time_base: Rational,
    /// Target bitrate in kbps.
    pub bitrate: u32,
    pub usage: Usage,
    pub error_resilient: u32,
    pub cpu_used: u32,
    pub cq_level: u32,
    pub layout: PixelLayout,
    /// 0 disables forced keyframes.
    pub keyframe_interval: u32,
    /// Stop after this many frames even if input remains.
    pub max_frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            codec: CodecRegistry::default().codecs[0].clone(),
            width: 416,
            height: 240,
            time_base: Rational::new(1, 30),
            bitrate: 200,
            usage: Usage::Realtime,
            error_resilient: 0,
            cpu_used: 8,
            cq_level: 45,
            layout: PixelLayout::I420,
            keyframe_interval: 0,
            max_frames: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_frame_size(self.width as i64, self.height as i64)?;
        self.time_base.validate()?;
        if self.max_frames == Some(0) {
            return Err(ConfigError::InvalidFrameLimit);
        }
        Ok(())
    }
}

pub fn validate_frame_size(width: i64, height: i64) -> Result<(), ConfigError> {
    if width <= 0 || height <= 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(ConfigError::InvalidFrameSize { width, height });
    }
    Ok(())
}

/// Converts a signed keyframe interval as typed by a user; negative values are
/// rejected here so the scheduler only ever sees valid intervals.
pub fn keyframe_interval(value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::InvalidKeyframeInterval(value))
}

/// 0 means "no limit".
pub fn max_frames(value: u64) -> Option<u64> {
    (value > 0).then_some(value)
}

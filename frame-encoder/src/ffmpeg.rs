//! libavcodec-backed encoder session.

use ffmpeg_next::{Dictionary, Rational as AvRational, picture};

use crate::{
    config::{CodecInfo, EncoderConfig, Usage},
    error::EncoderError,
    frame::{PLANE_COUNT, PixelLayout, PlanarFrame},
    packet::Packet,
    session::{EncodeFlags, EncoderBackend, EncoderSession},
};

fn encoder_error(err: ffmpeg_next::Error) -> EncoderError {
    let detail = match err {
        ffmpeg_next::Error::Other { errno } => Some(format!("errno {}", errno)),
        _ => None,
    };
    let e = EncoderError::new(err.to_string());
    match detail {
        Some(d) => e.with_detail(d),
        None => e,
    }
}

fn pixel_format(layout: PixelLayout) -> ffmpeg_next::format::Pixel {
    match layout {
        PixelLayout::I420 => ffmpeg_next::format::Pixel::YUV420P,
        PixelLayout::I420High => ffmpeg_next::format::Pixel::YUV420P10LE,
    }
}

pub struct FfmpegBackend {
    codec: CodecInfo,
}

impl FfmpegBackend {
    pub fn new(codec: CodecInfo) -> Self {
        Self { codec }
    }

    fn find_codec(&self) -> Result<ffmpeg_next::Codec, EncoderError> {
        ffmpeg_next::encoder::find_by_name(self.codec.encoder_name).ok_or_else(|| {
            EncoderError::new(format!("encoder not found: {}", self.codec.encoder_name))
        })
    }

    fn options(config: &EncoderConfig) -> Dictionary<'static> {
        let mut opts = Dictionary::new();
        opts.set("usage", config.usage.as_str());
        opts.set("cpu-used", &config.cpu_used.to_string());
        opts.set("crf", &config.cq_level.to_string());
        if config.error_resilient != 0 {
            opts.set("error-resilience", &config.error_resilient.to_string());
        }
        opts
    }
}

impl EncoderBackend for FfmpegBackend {
    type Session = FfmpegSession;

    fn name(&self) -> String {
        match self.find_codec() {
            Ok(codec) => codec.description().to_string(),
            Err(_) => self.codec.encoder_name.to_string(),
        }
    }

    fn default_config(&self, usage: Usage) -> Result<EncoderConfig, EncoderError> {
        self.find_codec()?;
        Ok(EncoderConfig::defaults(usage))
    }

    fn initialize(&self, config: &EncoderConfig) -> Result<FfmpegSession, EncoderError> {
        let codec = self.find_codec()?;
        let context = ffmpeg_next::codec::Context::new_with_codec(codec);
        let mut encoder = context.encoder().video().map_err(encoder_error)?;

        let time_base = AvRational::new(config.time_base.num, config.time_base.den);
        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(pixel_format(config.layout));
        encoder.set_time_base(time_base);
        encoder.set_frame_rate(Some(time_base.invert()));
        encoder.set_bit_rate(config.target_bitrate as usize * 1000);

        let encoder = encoder
            .open_with(Self::options(config))
            .map_err(encoder_error)?;
        log::info!(
            "opened {} ({}x{}, {:?})",
            self.codec.encoder_name,
            config.width,
            config.height,
            pixel_format(config.layout)
        );

        Ok(FfmpegSession {
            encoder,
            frame: ffmpeg_next::frame::Video::new(
                pixel_format(config.layout),
                config.width,
                config.height,
            ),
            packet: ffmpeg_next::codec::packet::Packet::empty(),
            eof_sent: false,
        })
    }
}

pub struct FfmpegSession {
    encoder: ffmpeg_next::codec::encoder::Video,
    frame: ffmpeg_next::frame::Video,
    packet: ffmpeg_next::codec::packet::Packet,
    eof_sent: bool,
}

impl FfmpegSession {
    fn load(&mut self, src: &PlanarFrame) {
        for index in 0..PLANE_COUNT {
            let plane = src.plane(index);
            let stride = self.frame.stride(index);
            let dst = self.frame.data_mut(index);
            for (y, row) in plane.rows().enumerate() {
                let start = y * stride;
                dst[start..start + row.len()].copy_from_slice(row);
            }
        }
    }
}

impl EncoderSession for FfmpegSession {
    fn submit(
        &mut self,
        frame: Option<&PlanarFrame>,
        pts: i64,
        flags: EncodeFlags,
    ) -> Result<(), EncoderError> {
        match frame {
            Some(src) => {
                self.load(src);
                self.frame.set_pts(Some(pts));
                self.frame.set_kind(if flags.force_keyframe {
                    picture::Type::I
                } else {
                    picture::Type::None
                });
                self.encoder.send_frame(&self.frame).map_err(encoder_error)
            }
            // libavcodec wants a single EOF; later flush calls only drain.
            None if self.eof_sent => Ok(()),
            None => {
                self.eof_sent = true;
                self.encoder.send_eof().map_err(encoder_error)
            }
        }
    }

    fn drain_next_packet(&mut self) -> Result<Option<Packet<'_>>, EncoderError> {
        match self.encoder.receive_packet(&mut self.packet) {
            Ok(()) => Ok(Some(Packet::frame(
                self.packet.data().unwrap_or_default(),
                self.packet.pts().unwrap_or(-1),
                self.packet.is_key(),
            ))),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::util::error::EAGAIN => {
                Ok(None)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(err) => Err(encoder_error(err)),
        }
    }
}

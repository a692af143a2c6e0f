//! Single-pass encode loop.
//!
//! ```text
//! Starting ──► Encoding ──► Flushing ──► Done
//!     │            │            │
//!     └────────────┴────────────┴──► Error
//! ```
//!
//! Encoding pulls one raw frame at a time from the input, submits it and
//! drains every packet it produced before reading the next frame. Flushing
//! submits "no frame" until a drain cycle comes back empty.

use std::io::{Read, Write};

use crate::{
    config::{EncoderConfig, Settings},
    error::{EncoderOp, PipelineError},
    frame::{FrameReader, PlanarFrame},
    keyframe::should_force_keyframe,
    session::{EncodeFlags, EncoderBackend, EncoderSession},
    sink::PacketSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Starting,
    Encoding,
    Flushing,
    Done,
    Error,
}

/// Observer notified as payloads reach the output.
pub trait Progress {
    fn on_packet(&mut self, is_key: bool);
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn on_packet(&mut self, _is_key: bool) {}
}

/// Prints `K` for every keyframe payload and `.` for the rest.
pub struct ProgressMarks<W: Write> {
    out: W,
}

impl<W: Write> ProgressMarks<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Progress for ProgressMarks<W> {
    fn on_packet(&mut self, is_key: bool) {
        let mark: &[u8] = if is_key { b"K" } else { b"." };
        if let Err(e) = self.out.write_all(mark).and_then(|_| self.out.flush()) {
            log::trace!("progress mark write failed: {}", e);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub frames_processed: u64,
    pub packets_written: u64,
    pub keyframes_written: u64,
    pub bytes_written: u64,
    /// Output positions (0-based) of payloads flagged as keyframes.
    pub keyframe_packets: Vec<u64>,
    /// Number of `submit(None)` calls the flush needed.
    pub flush_rounds: u64,
}

pub struct EncodePipeline<'a, B: EncoderBackend> {
    backend: &'a B,
    settings: Settings,
    progress: Box<dyn Progress + 'a>,
    state: State,
}

impl<'a, B: EncoderBackend> EncodePipeline<'a, B> {
    pub fn new(backend: &'a B, settings: Settings) -> Self {
        Self {
            backend,
            settings,
            progress: Box::new(NoProgress),
            state: State::Starting,
        }
    }

    pub fn with_progress(mut self, progress: impl Progress + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Encodes everything `input` holds (or up to the frame limit) into `output`.
    pub fn run<R: Read, W: Write>(
        &mut self,
        input: R,
        output: W,
    ) -> Result<EncodeSummary, PipelineError> {
        match self.encode(input, output) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.state = State::Error;
                log::error!("encode aborted: {}", e);
                Err(e)
            }
        }
    }

    fn configure(&self) -> Result<EncoderConfig, PipelineError> {
        let mut config = self
            .backend
            .default_config(self.settings.usage)
            .map_err(PipelineError::encoder(EncoderOp::Configure))?;
        config.apply(&self.settings);
        Ok(config)
    }

    fn encode<R: Read, W: Write>(
        &mut self,
        input: R,
        output: W,
    ) -> Result<EncodeSummary, PipelineError> {
        self.state = State::Starting;
        self.settings.validate()?;
        let config = self.configure()?;
        let mut session = self
            .backend
            .initialize(&config)
            .map_err(PipelineError::encoder(EncoderOp::Initialize))?;
        log::info!(
            "{} initialized: {}x{}, time base {}, {} kbps, usage {}",
            self.backend.name(),
            config.width,
            config.height,
            config.time_base,
            config.target_bitrate,
            config.usage.as_str()
        );

        let mut frame = PlanarFrame::new(config.width, config.height, config.layout);
        let mut reader = FrameReader::new(input);
        let mut sink = PacketSink::new(output);
        let mut summary = EncodeSummary::default();

        self.state = State::Encoding;
        let mut frame_index: u64 = 0;
        while self.state == State::Encoding {
            if !reader.read_frame(&mut frame) {
                self.state = State::Flushing;
                break;
            }

            let flags = EncodeFlags {
                force_keyframe: should_force_keyframe(
                    frame_index,
                    self.settings.keyframe_interval,
                ),
            };
            session
                .submit(Some(&frame), frame_index as i64, flags)
                .map_err(PipelineError::encoder(EncoderOp::Encode))?;
            self.drain(&mut session, &mut sink, &mut summary)?;

            log::debug!("encoded frame {}", frame_index);
            frame_index += 1;

            if self
                .settings
                .max_frames
                .is_some_and(|max| frame_index >= max)
            {
                log::info!("frame limit {} reached", frame_index);
                self.state = State::Flushing;
            }
        }
        summary.frames_processed = frame_index;

        log::info!("flushing encoder after {} frames", frame_index);
        loop {
            session
                .submit(None, frame_index as i64, EncodeFlags::NONE)
                .map_err(PipelineError::encoder(EncoderOp::Encode))?;
            summary.flush_rounds += 1;
            if self.drain(&mut session, &mut sink, &mut summary)? == 0 {
                break;
            }
        }

        self.state = State::Done;
        summary.packets_written = sink.packets_written();
        summary.keyframes_written = sink.keyframes_written();
        summary.bytes_written = sink.bytes_written();
        sink.finish().map_err(PipelineError::Write)?;
        session
            .destroy()
            .map_err(PipelineError::encoder(EncoderOp::Destroy))?;

        log::info!(
            "encode finished: {} frames, {} packets, {} bytes",
            summary.frames_processed,
            summary.packets_written,
            summary.bytes_written
        );
        Ok(summary)
    }

    /// Forwards every packet the session currently holds to the sink. Returns
    /// how many packets, of any kind, were drained.
    fn drain<W: Write>(
        &mut self,
        session: &mut B::Session,
        sink: &mut PacketSink<W>,
        summary: &mut EncodeSummary,
    ) -> Result<usize, PipelineError> {
        let mut drained = 0;
        while let Some(packet) = session
            .drain_next_packet()
            .map_err(PipelineError::encoder(EncoderOp::Drain))?
        {
            drained += 1;
            let position = sink.packets_written();
            if let Some(is_key) = sink.write_packet(&packet).map_err(PipelineError::Write)? {
                if is_key {
                    summary.keyframe_packets.push(position);
                }
                self.progress.on_packet(is_key);
            }
        }
        Ok(drained)
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;

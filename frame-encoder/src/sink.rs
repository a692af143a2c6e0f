use std::io::{self, Write};

use crate::packet::Packet;

/// Writes compressed frame payloads to a byte stream, back to back, with no
/// framing of its own.
pub struct PacketSink<W: Write> {
    writer: W,
    packets_written: u64,
    keyframes_written: u64,
    bytes_written: u64,
}

impl<W: Write> PacketSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            packets_written: 0,
            keyframes_written: 0,
            bytes_written: 0,
        }
    }

    /// Writes a frame payload verbatim and returns its keyframe flag.
    /// Packets of other kinds are skipped and return `None`.
    pub fn write_packet(&mut self, packet: &Packet<'_>) -> io::Result<Option<bool>> {
        let Some(frame) = packet.as_frame() else {
            log::trace!("skipping {} packet", packet.kind());
            return Ok(None);
        };

        self.writer.write_all(frame.data)?;

        self.packets_written += 1;
        self.bytes_written += frame.size() as u64;
        if frame.is_key {
            self.keyframes_written += 1;
        }
        log::trace!(
            "wrote packet pts: {}, size: {}, key: {}",
            frame.pts,
            frame.size(),
            frame.is_key
        );
        Ok(Some(frame.is_key))
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    pub fn keyframes_written(&self) -> u64 {
        self.keyframes_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes buffered output and hands the writer back.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_payloads_in_order_without_framing() {
        let mut sink = PacketSink::new(Vec::new());
        assert_eq!(
            sink.write_packet(&Packet::frame(&[1, 2, 3], 0, true)).unwrap(),
            Some(true)
        );
        assert_eq!(
            sink.write_packet(&Packet::frame(&[4, 5], 1, false)).unwrap(),
            Some(false)
        );
        assert_eq!(sink.packets_written(), 2);
        assert_eq!(sink.keyframes_written(), 1);
        assert_eq!(sink.bytes_written(), 5);
        assert_eq!(sink.finish().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn informational_packets_are_skipped() {
        let mut sink = PacketSink::new(Vec::new());
        assert_eq!(sink.write_packet(&Packet::Stats(&[9, 9])).unwrap(), None);
        assert_eq!(sink.write_packet(&Packet::Other("psnr")).unwrap(), None);
        assert_eq!(sink.packets_written(), 0);
        assert!(sink.finish().unwrap().is_empty());
    }

    #[test]
    fn short_write_is_an_error() {
        let mut buf = [0u8; 4];
        let mut sink = PacketSink::new(&mut buf[..]);
        sink.write_packet(&Packet::frame(&[1, 2, 3], 0, true))
            .unwrap();
        let err = sink
            .write_packet(&Packet::frame(&[4, 5, 6], 1, false))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(sink.packets_written(), 1);
    }
}

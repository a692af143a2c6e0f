use std::io::{ErrorKind, Read};

/// Number of planes in a 4:2:0 frame.
pub const PLANE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelLayout {
    /// 8-bit 4:2:0 planar.
    #[default]
    I420,
    /// 4:2:0 planar with 16-bit little-endian sample containers.
    I420High,
}

impl PixelLayout {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelLayout::I420 => 1,
            PixelLayout::I420High => 2,
        }
    }
}

/// One rectangular sample buffer.
#[derive(Debug, Clone)]
pub struct Plane {
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
    data: Vec<u8>,
}

impl Plane {
    fn new(width: usize, height: usize, bytes_per_sample: usize, align: usize) -> Self {
        let row_bytes = width * bytes_per_sample;
        let stride = row_bytes.div_ceil(align) * align;
        Self {
            width,
            height,
            stride,
            bytes_per_sample,
            data: vec![0; stride * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Meaningful bytes per row, excluding stride padding.
    pub fn row_bytes(&self) -> usize {
        self.width * self.bytes_per_sample
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let len = self.row_bytes();
        &mut self.data[start..start + len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.height).map(move |y| self.row(y))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A raw 4:2:0 picture, allocated once and overwritten for every input frame.
#[derive(Debug, Clone)]
pub struct PlanarFrame {
    width: u32,
    height: u32,
    planes: [Plane; PLANE_COUNT],
}

impl PlanarFrame {
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Self {
        Self::with_alignment(width, height, layout, 1)
    }

    /// Allocates planes whose stride is rounded up to a multiple of `align` bytes.
    pub fn with_alignment(width: u32, height: u32, layout: PixelLayout, align: usize) -> Self {
        let align = align.max(1);
        let bps = layout.bytes_per_sample();
        let (w, h) = (width as usize, height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        Self {
            width,
            height,
            planes: [
                Plane::new(w, h, bps, align),
                Plane::new(cw, ch, bps, align),
                Plane::new(cw, ch, bps, align),
            ],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane(&self, index: usize) -> &Plane {
        &self.planes[index]
    }

    /// Size of one frame in a packed raw file.
    pub fn packed_size(&self) -> usize {
        self.planes.iter().map(|p| p.row_bytes() * p.height()).sum()
    }
}

/// Reads packed raw frames from a byte stream into a [`PlanarFrame`].
///
/// A frame is either read completely or not at all: rows are staged in an
/// internal buffer and only copied into the destination planes once the
/// whole frame has arrived.
pub struct FrameReader<R> {
    inner: R,
    scratch: Vec<u8>,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
            frames_read: 0,
        }
    }

    /// Returns `true` if `frame` now holds the next input frame. End of input,
    /// a short read and an I/O error all return `false` and leave `frame`
    /// untouched.
    pub fn read_frame(&mut self, frame: &mut PlanarFrame) -> bool {
        let size = frame.packed_size();
        self.scratch.resize(size, 0);

        if let Err(e) = self.inner.read_exact(&mut self.scratch) {
            if e.kind() != ErrorKind::UnexpectedEof {
                log::warn!("frame read failed after {} frames: {}", self.frames_read, e);
            }
            return false;
        }

        let mut offset = 0;
        for plane in frame.planes.iter_mut() {
            let row_bytes = plane.row_bytes();
            for y in 0..plane.height() {
                plane
                    .row_mut(y)
                    .copy_from_slice(&self.scratch[offset..offset + row_bytes]);
                offset += row_bytes;
            }
        }
        self.frames_read += 1;
        true
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    fn frame_bytes(frame: &PlanarFrame, seed: u8) -> Vec<u8> {
        (0..frame.packed_size())
            .map(|i| seed.wrapping_add(i as u8))
            .collect()
    }

    #[test]
    fn plane_geometry_i420() {
        let frame = PlanarFrame::new(416, 240, PixelLayout::I420);
        assert_eq!(frame.plane(0).width(), 416);
        assert_eq!(frame.plane(1).width(), 208);
        assert_eq!(frame.plane(2).height(), 120);
        assert_eq!(frame.packed_size(), 416 * 240 * 3 / 2);
    }

    #[test]
    fn high_bitdepth_doubles_row_bytes() {
        let frame = PlanarFrame::new(64, 32, PixelLayout::I420High);
        assert_eq!(frame.plane(0).row_bytes(), 128);
        assert_eq!(frame.plane(1).row_bytes(), 64);
        assert_eq!(frame.packed_size(), 64 * 32 * 3);
    }

    #[test]
    fn reads_exactly_k_frames_then_stops() {
        let mut frame = PlanarFrame::new(16, 8, PixelLayout::I420);
        let mut input = Vec::new();
        for k in 0..4 {
            input.extend(frame_bytes(&frame, k * 10));
        }
        let mut reader = FrameReader::new(Cursor::new(input));

        for k in 0..4u8 {
            assert!(reader.read_frame(&mut frame));
            assert_eq!(frame.plane(0).row(0)[0], k * 10);
        }
        assert!(!reader.read_frame(&mut frame));
        assert!(!reader.read_frame(&mut frame));
        assert_eq!(reader.frames_read(), 4);
    }

    #[test]
    fn short_read_leaves_frame_untouched() {
        let mut frame = PlanarFrame::new(16, 8, PixelLayout::I420);
        let full = frame_bytes(&frame, 1);
        // ends halfway through the V plane
        let cut = full.len() - 8;
        let mut input = full.clone();
        input.extend(frame_bytes(&frame, 100).into_iter().take(cut));
        let mut reader = FrameReader::new(Cursor::new(input));

        assert!(reader.read_frame(&mut frame));
        let before = frame.clone();
        assert!(!reader.read_frame(&mut frame));
        for i in 0..PLANE_COUNT {
            assert_eq!(frame.plane(i).data(), before.plane(i).data());
        }
        assert_eq!(reader.frames_read(), 1);
    }

    #[test]
    fn rows_land_at_stride_offsets() {
        let mut frame = PlanarFrame::with_alignment(6, 4, PixelLayout::I420, 16);
        assert_eq!(frame.plane(0).stride(), 16);
        assert_eq!(frame.plane(1).stride(), 16);

        let input = frame_bytes(&frame, 0);
        let mut reader = FrameReader::new(Cursor::new(input));
        assert!(reader.read_frame(&mut frame));

        let luma = frame.plane(0);
        assert_eq!(luma.row(0), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(luma.row(1), &[6, 7, 8, 9, 10, 11]);
        assert_eq!(&luma.data()[16..22], &[6, 7, 8, 9, 10, 11]);
        assert_eq!(&luma.data()[6..16], &[0; 10]);
        // U follows the 24 luma bytes, 3x2 samples
        assert_eq!(frame.plane(1).row(0), &[24, 25, 26]);
        assert_eq!(frame.plane(2).row(1), &[33, 34, 35]);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn io_error_is_treated_as_end_of_input() {
        let mut frame = PlanarFrame::new(16, 8, PixelLayout::I420);
        let mut reader = FrameReader::new(FailingReader);
        assert!(!reader.read_frame(&mut frame));
    }
}

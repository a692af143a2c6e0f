/// Compressed picture data drained from an encoder session.
///
/// The bytes are borrowed from the session and are only valid until the next
/// call into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacket<'a> {
    pub data: &'a [u8],
    pub pts: i64,
    pub is_key: bool,
}

impl FramePacket<'_> {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One unit of encoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    Frame(FramePacket<'a>),
    /// First-pass statistics.
    Stats(&'a [u8]),
    /// Any other informational output, named by kind.
    Other(&'static str),
}

impl<'a> Packet<'a> {
    pub fn frame(data: &'a [u8], pts: i64, is_key: bool) -> Self {
        Packet::Frame(FramePacket { data, pts, is_key })
    }

    pub fn as_frame(&self) -> Option<&FramePacket<'a>> {
        match self {
            Packet::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Frame(_) => "frame",
            Packet::Stats(_) => "stats",
            Packet::Other(kind) => kind,
        }
    }
}

/// Whether the frame at `frame_index` must be submitted as a forced keyframe.
///
/// An `interval` of 0 leaves keyframe placement entirely to the encoder.
/// Otherwise every `interval`-th frame is forced, starting with frame 0.
pub fn should_force_keyframe(frame_index: u64, interval: u32) -> bool {
    interval > 0 && frame_index % interval as u64 == 0
}

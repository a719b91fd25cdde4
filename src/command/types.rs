use crate::synth::SoundKey;

/// Messages from the control side to the audio thread
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Start `sound` at an absolute output frame
    Schedule { at_frame: u64, sound: SoundKey },
    /// Drop every pending voice starting at or after this frame
    CancelFrom(u64),
}

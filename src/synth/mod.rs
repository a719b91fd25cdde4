pub mod bank;
pub mod instrument;
pub mod tone;
pub mod wav;

pub use bank::{SampleBank, SoundKey};
pub use instrument::{Instrument, SoundSet, Waveform};

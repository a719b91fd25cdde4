pub mod clock;
pub mod engine;
pub mod mixer;
pub mod trigger;

pub use clock::AudioClock;
pub use engine::AudioEngine;
pub use mixer::DEFAULT_VOLUME;
pub use trigger::ClickTrigger;

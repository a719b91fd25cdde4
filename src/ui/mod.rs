pub mod controls;
pub mod theme;
pub mod wheel;

pub use controls::{render_pattern_info, render_patterns, render_sounds, render_transport, TransportInfo};
pub use theme::Theme;
pub use wheel::render_wheel;

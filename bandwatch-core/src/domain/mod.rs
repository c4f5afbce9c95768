//! Domain types: bars and signal matches.

pub mod bar;
pub mod signal;

pub use bar::Bar;
pub use signal::{SignalDirection, SignalMatch};

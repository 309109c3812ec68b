//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod sampler;

pub use display::{Cursor, DisplayError, NullDisplay, TextDisplay, TextDisplayExt};
pub use sampler::Sampler;

//! Configuration
//!
//! Board-agnostic configuration structures and a small `no_std` parser for
//! the `gauge.toml` file embedded in the firmware.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;

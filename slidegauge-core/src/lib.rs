//! Board-agnostic core logic for the slide-pot distance gauge
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (sampler, display)
//! - Raw sample and fixed-point distance types
//! - Sample-to-distance conversion with configurable calibration
//! - Fixed-width distance formatting
//! - Single-slot mailbox between the sampling trigger and the display loop
//! - Periodic trigger (producer) with change filtering
//! - Consumer loop protocol
//! - Configuration types and parsing
//!
//! # Data flow
//!
//! ```text
//! Trigger ──► Sampler ──► Converter ──► Mailbox ──► Consumer ──► Formatter ──► Display
//! (interrupt priority)                     │        (background)
//!                                   single slot,
//!                                   newest wins
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod consumer;
pub mod convert;
pub mod distance;
pub mod format;
pub mod mailbox;
pub mod sample;
pub mod traits;
pub mod trigger;

pub use convert::{convert, Calibration};
pub use distance::Distance;
pub use format::{format, DisplayString};
pub use mailbox::{Mailbox, Publisher, Receiver};
pub use sample::{RawSample, SAMPLE_MAX};
pub use trigger::{SampleTrigger, TickOutcome};

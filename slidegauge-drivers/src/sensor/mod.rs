//! Position sensors

pub mod adc;

pub use adc::{AdcReader, AdcSampler};

//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in slidegauge-core:
//!
//! - ADC-backed sampler for the slide potentiometer
//! - PCD8544 (Nokia 5110) LCD over SPI
//! - In-memory character screen for headless runs

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;

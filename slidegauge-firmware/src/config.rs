//! Configuration loading
//!
//! The gauge configuration is `gauge.toml`, embedded at compile time and
//! already checked by the build script. Parsing it again on target can
//! still fail if the on-target parser and the build-time check disagree;
//! in that case the built-in defaults are used.

use defmt::*;

use slidegauge_core::config::{parse_config, GaugeConfig};

/// Embedded configuration (compiled into firmware)
/// Edit gauge.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../gauge.toml");

/// Load the embedded configuration, falling back to defaults
pub fn load() -> GaugeConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            warn!("Using built-in default configuration");
            GaugeConfig::default()
        }
    };
    log_summary(&config);
    config
}

/// Log the values the tasks will run with
fn log_summary(config: &GaugeConfig) {
    let sampling = &config.sampling;
    info!(
        "Sampling: {} ticks @ {} Hz = {} us ({} Hz)",
        sampling.period_ticks,
        sampling.clock_hz,
        sampling.period_us(),
        sampling.frequency_hz()
    );

    let cal = &config.calibration;
    info!(
        "Calibration: (s * {} + {}) >> {}, half-up rounding: {}",
        cal.scale,
        cal.bias,
        cal.shift,
        cal.rounds_half_up()
    );

    let display = &config.display;
    if display.enabled {
        info!(
            "Display: value at col {} row {}",
            display.value_at.col, display.value_at.row
        );
    } else {
        info!("Display: disabled, running headless");
    }
}

//! Build script for slidegauge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates gauge.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Characters per display row
const TEXT_COLS: i64 = 14;
/// Character rows on the display
const TEXT_ROWS: i64 = 6;
/// Width of a formatted distance
const VALUE_WIDTH: i64 = 8;

/// Defaults the firmware uses for keys missing from gauge.toml
const DEFAULT_PERIOD_TICKS: i64 = 2_000_000;
const DEFAULT_CLOCK_HZ: i64 = 80_000_000;
const DEFAULT_BIAS: i64 = 512;
const DEFAULT_SHIFT: i64 = 10;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate gauge.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=gauge.toml");

    let config_path = Path::new("gauge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gauge.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds gauge.toml as its configuration.            ║\n\
            ║  Please create one in the slidegauge-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read gauge.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gauge.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    check_known_sections(&config, &mut errors);
    validate_sampling(&config, &mut errors);
    validate_calibration(&config, &mut errors);
    validate_display(&config, &mut errors);
    report("Invalid gauge configuration", &errors);

    println!("cargo:warning=gauge.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panic with a boxed list of errors, if any
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Only the sections the on-target parser understands are allowed
fn check_known_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !["sampling", "calibration", "display"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Check that every key in a section is known
fn check_keys(section: &str, table: &toml::Table, known: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

/// Read an integer key and check its range
fn int_in_range(
    section: &str,
    table: &toml::Table,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn validate_sampling(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.get("sampling").and_then(|s| s.as_table()) else {
        return;
    };
    check_keys("sampling", table, &["period_ticks", "clock_hz"], errors);

    let max = u32::MAX as i64;
    let before = errors.len();
    let period = int_in_range("sampling", table, "period_ticks", 1, max, errors)
        .unwrap_or(DEFAULT_PERIOD_TICKS);
    let clock =
        int_in_range("sampling", table, "clock_hz", 1, max, errors).unwrap_or(DEFAULT_CLOCK_HZ);

    // The trigger runs on a microsecond ticker
    if errors.len() == before && period * 1_000_000 / clock == 0 {
        errors.push("[sampling] period is shorter than 1 us".to_string());
    }
}

fn validate_calibration(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.get("calibration").and_then(|s| s.as_table()) else {
        return;
    };
    check_keys("calibration", table, &["scale", "bias", "shift", "span"], errors);

    // span derives all three constants, so it stands alone
    if table.contains_key("span") {
        for key in ["scale", "bias", "shift"] {
            if table.contains_key(key) {
                errors.push(format!("[calibration] span cannot be combined with {}", key));
            }
        }
    }

    let max = u32::MAX as i64;
    let before = errors.len();
    int_in_range("calibration", table, "scale", 0, max, errors);
    int_in_range("calibration", table, "span", 0, max, errors);
    let shift =
        int_in_range("calibration", table, "shift", 0, 31, errors).unwrap_or(DEFAULT_SHIFT);
    let bias = int_in_range("calibration", table, "bias", 0, max, errors).unwrap_or(DEFAULT_BIAS);

    if errors.len() == before && !table.contains_key("span") && bias >= 1 << shift {
        errors.push(format!("[calibration] bias {} must be below 2^{}", bias, shift));
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.get("display").and_then(|s| s.as_table()) else {
        return;
    };
    check_keys(
        "display",
        table,
        &["enabled", "title", "greeting", "row", "col"],
        errors,
    );

    if let Some(enabled) = table.get("enabled") {
        if !enabled.is_bool() {
            errors.push("[display] enabled must be true or false".to_string());
        }
    }

    for key in ["title", "greeting"] {
        match table.get(key) {
            None => {}
            Some(toml::Value::String(s)) => {
                if !s.is_ascii() {
                    errors.push(format!("[display] {} must be ASCII", key));
                }
                if s.len() > TEXT_COLS as usize {
                    errors.push(format!("[display] {} longer than {} chars", key, TEXT_COLS));
                }
            }
            Some(_) => errors.push(format!("[display] {} must be a string", key)),
        }
    }

    int_in_range("display", table, "row", 0, TEXT_ROWS - 1, errors);
    int_in_range("display", table, "col", 0, TEXT_COLS - VALUE_WIDTH, errors);
}

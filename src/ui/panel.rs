//! Plain-text dashboard panel
//!
//! Renders a [`DisplayState`] snapshot into a string for the terminal. Raised
//! alert flags are drawn in red.

use std::fmt::Write;

use chrono::{DateTime, Local};
use colored::Colorize;
use roomba_core::display_state::{FlagSet, Series};
use roomba_core::DisplayState;

use super::keys::KEY_HELP;
use crate::log_buffer::LogEntry;

pub const PANEL_TIMESTAMP_FORMAT: &str = "%Y/%m/%d - %H-%M-%S";

const GAUGE_WIDTH: usize = 30;
const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Battery gauge as `[#####.....]  50.00%`
pub fn gauge(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>6.2}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        percent
    )
}

/// History points on a fixed 0..=100 scale
pub fn sparkline(points: impl Iterator<Item = f64>) -> String {
    points
        .map(|p| {
            let idx = (p.clamp(0.0, 100.0) / 100.0 * (SPARK.len() - 1) as f64).round() as usize;
            SPARK[idx]
        })
        .collect()
}

fn flag_row(out: &mut String, title: &str, set: FlagSet, state: &DisplayState) {
    let cells: Vec<String> = set
        .labels()
        .iter()
        .zip(state.flags(set))
        .map(|(label, &raised)| {
            if raised {
                label.on_red().white().bold().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{:<16}{}", title, cells.join("  "));
}

fn series_row(out: &mut String, title: &str, series: Series, state: &DisplayState) {
    let cells: Vec<String> = series
        .labels()
        .iter()
        .zip(state.series(series))
        .map(|(label, value)| format!("{} {}", label, value))
        .collect();
    let _ = writeln!(out, "{:<16}{}", title, cells.join(" | "));
}

pub fn render(state: &DisplayState, logs: &[LogEntry], now: DateTime<Local>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}  {}", "Roomba Dashboard".bold(), now.format(PANEL_TIMESTAMP_FORMAT));
    let keys: Vec<String> = KEY_HELP.iter().map(|(k, what)| format!("{} {}", k.cyan(), what)).collect();
    let _ = writeln!(out, "{}", keys.join("  "));
    let _ = writeln!(out);

    let mode = if state.has_alert() {
        state.mode.red().bold()
    } else {
        state.mode.green().bold()
    };
    let _ = writeln!(out, "{:<16}{}   charging: {}   stasis: {}", "Mode", mode, state.charging_state, state.stasis);
    let _ = writeln!(
        out,
        "{:<16}{}  ({} / {} mAh)",
        "Battery",
        gauge(state.battery.percent, GAUGE_WIDTH),
        state.battery.charge_mah,
        state.battery.capacity_mah
    );
    let _ = writeln!(out, "{:<16}{}", "History", sparkline(state.battery_history.points()));
    let _ = writeln!(
        out,
        "{:<16}{} mV  {} mA  {} C  dirt {}%",
        "Power",
        state.voltage_mv,
        state.current_ma,
        state.temperature_c,
        state.dirt_percent
    );
    let _ = writeln!(
        out,
        "{:<16}omni {}  left {}  right {}",
        "Infrared", state.ir_omni, state.ir_left, state.ir_right
    );
    let _ = writeln!(out);

    series_row(&mut out, "Motion", Series::Motion, state);
    series_row(&mut out, "Velocity", Series::Velocity, state);
    series_row(&mut out, "Motor current", Series::MotorCurrent, state);
    series_row(&mut out, "Cliff signal", Series::CliffSignal, state);
    series_row(&mut out, "Light bump", Series::LightBumpSignal, state);
    let _ = writeln!(out);

    flag_row(&mut out, "Cliffs", FlagSet::Cliff, state);
    flag_row(&mut out, "Light bumper", FlagSet::LightBumper, state);
    flag_row(&mut out, "Wheels", FlagSet::Wheel, state);
    flag_row(&mut out, "Overcurrent", FlagSet::Overcurrent, state);
    flag_row(&mut out, "Charger", FlagSet::ChargingSources, state);
    flag_row(&mut out, "Virtual wall", FlagSet::VirtualWall, state);

    if !logs.is_empty() {
        let _ = writeln!(out);
        for entry in logs {
            let _ = writeln!(out, "{:>5} {}", entry.level, entry.message);
        }
    }
    out
}

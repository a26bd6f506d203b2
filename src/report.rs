/// Plain-text telemetry report printed in headless mode
use std::io::{self, Write};

use chrono::{DateTime, Local};
use roomba_core::{packets, DecodedSample};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H%M%S";

/// The line that opens every poll cycle
pub fn write_timestamp<W: Write>(out: &mut W, now: DateTime<Local>) -> io::Result<()> {
    writeln!(out, "{}", now.format(TIMESTAMP_FORMAT))
}

/// One `name:  value` line per packet, names right-aligned to 25 columns
pub fn write_sample<W: Write>(out: &mut W, sample: &DecodedSample) -> io::Result<()> {
    for reading in sample.iter() {
        let name = packets::lookup(reading.packet)
            .map(|spec| spec.name)
            .unwrap_or("Unknown");
        writeln!(out, "{:>25}:  {}", name, reading.value)?;
    }
    Ok(())
}

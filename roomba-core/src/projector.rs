/// State projector
/// Folds decoded telemetry into the display state using a per-packet table of behaviours

use std::time::UNIX_EPOCH;

use crate::decoder::DecodedSample;
use crate::display_state::{DisplayState, FlagSet, LabelSlot, Scalar, Series};
use crate::labels::LabelTable;
use crate::packets::*;

/// What a packet does to the display state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Scalar(Scalar),
    Series(Series, usize),
    Label(LabelTable, LabelSlot),
    /// Non-zero value raises one flag
    Flag(FlagSet, usize),
    /// Slot `i` follows bit mask `masks[i]`, LSB first
    Bitmask(FlagSet, &'static [u8]),
    BatteryCharge,
    BatteryCapacity,
    DirtLevel,
}

static LOW_BITS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];
// Bit 1 of the overcurrent byte is unused
static OVERCURRENT_BITS: [u8; 4] = [0x01, 0x04, 0x08, 0x10];

static PROJECTIONS: &[(u8, Projection)] = &[
    (BUMPS_WHEEL_DROPS, Projection::Bitmask(FlagSet::Wheel, &LOW_BITS)),
    (WALL, Projection::Flag(FlagSet::Cliff, 4)),
    (CLIFF_LEFT, Projection::Flag(FlagSet::Cliff, 0)),
    (CLIFF_FRONT_LEFT, Projection::Flag(FlagSet::Cliff, 1)),
    (CLIFF_FRONT_RIGHT, Projection::Flag(FlagSet::Cliff, 2)),
    (CLIFF_RIGHT, Projection::Flag(FlagSet::Cliff, 3)),
    (VIRTUAL_WALL, Projection::Flag(FlagSet::VirtualWall, 0)),
    (WHEEL_OVERCURRENTS, Projection::Bitmask(FlagSet::Overcurrent, &OVERCURRENT_BITS)),
    (DIRT_DETECT, Projection::DirtLevel),
    (IR_OMNI, Projection::Label(LabelTable::InfraredCode, LabelSlot::IrOmni)),
    (DISTANCE, Projection::Series(Series::Motion, 4)),
    (ANGLE, Projection::Series(Series::Motion, 3)),
    (CHARGING_STATE, Projection::Label(LabelTable::ChargingState, LabelSlot::ChargingState)),
    (VOLTAGE, Projection::Scalar(Scalar::Voltage)),
    (CURRENT, Projection::Scalar(Scalar::Current)),
    (TEMPERATURE, Projection::Scalar(Scalar::Temperature)),
    (BATTERY_CHARGE, Projection::BatteryCharge),
    (BATTERY_CAPACITY, Projection::BatteryCapacity),
    (WALL_SIGNAL, Projection::Series(Series::CliffSignal, 4)),
    (CLIFF_LEFT_SIGNAL, Projection::Series(Series::CliffSignal, 0)),
    (CLIFF_FRONT_LEFT_SIGNAL, Projection::Series(Series::CliffSignal, 1)),
    (CLIFF_FRONT_RIGHT_SIGNAL, Projection::Series(Series::CliffSignal, 2)),
    (CLIFF_RIGHT_SIGNAL, Projection::Series(Series::CliffSignal, 3)),
    (CHARGING_SOURCES, Projection::Bitmask(FlagSet::ChargingSources, &LOW_BITS)),
    (OI_MODE, Projection::Label(LabelTable::OiMode, LabelSlot::Mode)),
    (REQUESTED_VELOCITY, Projection::Series(Series::Velocity, 0)),
    (REQUESTED_RADIUS, Projection::Series(Series::Motion, 2)),
    (REQUESTED_RIGHT_VELOCITY, Projection::Series(Series::Velocity, 1)),
    (REQUESTED_LEFT_VELOCITY, Projection::Series(Series::Velocity, 2)),
    (LEFT_ENCODER, Projection::Series(Series::Motion, 0)),
    (RIGHT_ENCODER, Projection::Series(Series::Motion, 1)),
    (LIGHT_BUMPER, Projection::Bitmask(FlagSet::LightBumper, &LOW_BITS)),
    (LIGHT_BUMP_LEFT, Projection::Series(Series::LightBumpSignal, 0)),
    (LIGHT_BUMP_FRONT_LEFT, Projection::Series(Series::LightBumpSignal, 1)),
    (LIGHT_BUMP_CENTER_LEFT, Projection::Series(Series::LightBumpSignal, 2)),
    (LIGHT_BUMP_CENTER_RIGHT, Projection::Series(Series::LightBumpSignal, 3)),
    (LIGHT_BUMP_FRONT_RIGHT, Projection::Series(Series::LightBumpSignal, 4)),
    (LIGHT_BUMP_RIGHT, Projection::Series(Series::LightBumpSignal, 5)),
    (IR_LEFT, Projection::Label(LabelTable::InfraredCode, LabelSlot::IrLeft)),
    (IR_RIGHT, Projection::Label(LabelTable::InfraredCode, LabelSlot::IrRight)),
    (LEFT_MOTOR_CURRENT, Projection::Series(Series::MotorCurrent, 0)),
    (RIGHT_MOTOR_CURRENT, Projection::Series(Series::MotorCurrent, 1)),
    (MAIN_BRUSH_MOTOR_CURRENT, Projection::Series(Series::MotorCurrent, 2)),
    (SIDE_BRUSH_MOTOR_CURRENT, Projection::Series(Series::MotorCurrent, 3)),
    (STASIS, Projection::Label(LabelTable::Stasis, LabelSlot::Stasis)),
];

/// Display behaviour for a packet; `None` for packets the dashboard does not show
pub fn projection_for(packet: u8) -> Option<Projection> {
    PROJECTIONS
        .iter()
        .find(|(id, _)| *id == packet)
        .map(|(_, projection)| *projection)
}

/// Apply one decoded sample to the display state
pub fn project(sample: &DecodedSample, state: &mut DisplayState) {
    for reading in sample.iter() {
        if let Some(projection) = projection_for(reading.packet) {
            apply(projection, reading.value, state);
        }
    }

    state.samples_projected += 1;
    state.updated_at_ms = sample
        .decoded_at
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64);
}

pub fn apply(projection: Projection, value: i32, state: &mut DisplayState) {
    match projection {
        Projection::Scalar(slot) => *state.scalar_mut(slot) = value,
        Projection::Series(series, index) => {
            if let Some(slot) = state.series_mut(series).get_mut(index) {
                *slot = value;
            }
        }
        Projection::Label(table, slot) => {
            let label = table.label_or_unknown(value);
            let target = state.label_mut(slot);
            if target.as_str() != label {
                *target = label.to_string();
            }
        }
        Projection::Flag(set, index) => {
            if let Some(flag) = state.flags_mut(set).get_mut(index) {
                *flag = value != 0;
            }
        }
        Projection::Bitmask(set, masks) => {
            // Every slot is rewritten so a bit that went low clears its flag
            for (flag, &mask) in state.flags_mut(set).iter_mut().zip(masks) {
                *flag = (value & mask as i32) != 0;
            }
        }
        Projection::BatteryCapacity => state.battery.set_capacity(value),
        Projection::BatteryCharge => {
            let percent = state.battery.set_charge(value);
            state.battery_history.record(percent);
        }
        Projection::DirtLevel => {
            state.dirt_percent = (value.clamp(0, 255) as u32 * 100 / 255) as u8;
        }
    }
}

/// Open Interface sensor packet catalog
/// Every telemetry field the robot can report, with its wire width and signedness

use serde::Serialize;

/// Wire width of a single packet. Two-byte packets are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Width {
    One,
    Two,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PacketSpec {
    pub id: u8,
    pub width: Width,
    pub signed: bool,
    pub name: &'static str,
}

impl PacketSpec {
    const fn new(id: u8, width: Width, signed: bool, name: &'static str) -> Self {
        Self { id, width, signed, name }
    }

    /// Interpret `raw` (exactly `width` bytes) according to this packet's signedness
    pub fn interpret(&self, raw: &[u8]) -> i32 {
        match (self.width, self.signed) {
            (Width::One, false) => raw[0] as i32,
            (Width::One, true) => raw[0] as i8 as i32,
            (Width::Two, false) => u16::from_be_bytes([raw[0], raw[1]]) as i32,
            (Width::Two, true) => i16::from_be_bytes([raw[0], raw[1]]) as i32,
        }
    }
}

// Packet ids
pub const BUMPS_WHEEL_DROPS: u8 = 7;
pub const WALL: u8 = 8;
pub const CLIFF_LEFT: u8 = 9;
pub const CLIFF_FRONT_LEFT: u8 = 10;
pub const CLIFF_FRONT_RIGHT: u8 = 11;
pub const CLIFF_RIGHT: u8 = 12;
pub const VIRTUAL_WALL: u8 = 13;
pub const WHEEL_OVERCURRENTS: u8 = 14;
pub const DIRT_DETECT: u8 = 15;
pub const UNUSED_16: u8 = 16;
pub const IR_OMNI: u8 = 17;
pub const BUTTONS: u8 = 18;
pub const DISTANCE: u8 = 19;
pub const ANGLE: u8 = 20;
pub const CHARGING_STATE: u8 = 21;
pub const VOLTAGE: u8 = 22;
pub const CURRENT: u8 = 23;
pub const TEMPERATURE: u8 = 24;
pub const BATTERY_CHARGE: u8 = 25;
pub const BATTERY_CAPACITY: u8 = 26;
pub const WALL_SIGNAL: u8 = 27;
pub const CLIFF_LEFT_SIGNAL: u8 = 28;
pub const CLIFF_FRONT_LEFT_SIGNAL: u8 = 29;
pub const CLIFF_FRONT_RIGHT_SIGNAL: u8 = 30;
pub const CLIFF_RIGHT_SIGNAL: u8 = 31;
pub const UNUSED_32: u8 = 32;
pub const UNUSED_33: u8 = 33;
pub const CHARGING_SOURCES: u8 = 34;
pub const OI_MODE: u8 = 35;
pub const SONG_NUMBER: u8 = 36;
pub const SONG_PLAYING: u8 = 37;
pub const STREAM_PACKETS: u8 = 38;
pub const REQUESTED_VELOCITY: u8 = 39;
pub const REQUESTED_RADIUS: u8 = 40;
pub const REQUESTED_RIGHT_VELOCITY: u8 = 41;
pub const REQUESTED_LEFT_VELOCITY: u8 = 42;
pub const LEFT_ENCODER: u8 = 43;
pub const RIGHT_ENCODER: u8 = 44;
pub const LIGHT_BUMPER: u8 = 45;
pub const LIGHT_BUMP_LEFT: u8 = 46;
pub const LIGHT_BUMP_FRONT_LEFT: u8 = 47;
pub const LIGHT_BUMP_CENTER_LEFT: u8 = 48;
pub const LIGHT_BUMP_CENTER_RIGHT: u8 = 49;
pub const LIGHT_BUMP_FRONT_RIGHT: u8 = 50;
pub const LIGHT_BUMP_RIGHT: u8 = 51;
pub const IR_LEFT: u8 = 52;
pub const IR_RIGHT: u8 = 53;
pub const LEFT_MOTOR_CURRENT: u8 = 54;
pub const RIGHT_MOTOR_CURRENT: u8 = 55;
pub const MAIN_BRUSH_MOTOR_CURRENT: u8 = 56;
pub const SIDE_BRUSH_MOTOR_CURRENT: u8 = 57;
pub const STASIS: u8 = 58;

use Width::{One, Two};

/// Packets 7 through 58, indexed by `id - FIRST_PACKET`
static CATALOG: [PacketSpec; 52] = [
    PacketSpec::new(BUMPS_WHEEL_DROPS, One, false, "Bumps and Wheel Drops"),
    PacketSpec::new(WALL, One, false, "Wall"),
    PacketSpec::new(CLIFF_LEFT, One, false, "Cliff Left"),
    PacketSpec::new(CLIFF_FRONT_LEFT, One, false, "Cliff Front Left"),
    PacketSpec::new(CLIFF_FRONT_RIGHT, One, false, "Cliff Front Right"),
    PacketSpec::new(CLIFF_RIGHT, One, false, "Cliff Right"),
    PacketSpec::new(VIRTUAL_WALL, One, false, "Virtual Wall"),
    PacketSpec::new(WHEEL_OVERCURRENTS, One, false, "Wheel Overcurrents"),
    PacketSpec::new(DIRT_DETECT, One, false, "Dirt Detect"),
    PacketSpec::new(UNUSED_16, One, false, "Unused Byte"),
    PacketSpec::new(IR_OMNI, One, false, "Infrared Character Omni"),
    PacketSpec::new(BUTTONS, One, false, "Buttons"),
    PacketSpec::new(DISTANCE, Two, true, "Distance"),
    PacketSpec::new(ANGLE, Two, true, "Angle"),
    PacketSpec::new(CHARGING_STATE, One, false, "Charging State"),
    PacketSpec::new(VOLTAGE, Two, false, "Voltage"),
    PacketSpec::new(CURRENT, Two, true, "Current"),
    PacketSpec::new(TEMPERATURE, One, true, "Temperature"),
    PacketSpec::new(BATTERY_CHARGE, Two, false, "Battery Charge"),
    PacketSpec::new(BATTERY_CAPACITY, Two, false, "Battery Capacity"),
    PacketSpec::new(WALL_SIGNAL, Two, false, "Wall Signal"),
    PacketSpec::new(CLIFF_LEFT_SIGNAL, Two, false, "Cliff Left Signal"),
    PacketSpec::new(CLIFF_FRONT_LEFT_SIGNAL, Two, false, "Cliff Front Left Signal"),
    PacketSpec::new(CLIFF_FRONT_RIGHT_SIGNAL, Two, false, "Cliff Front Right Signal"),
    PacketSpec::new(CLIFF_RIGHT_SIGNAL, Two, false, "Cliff Right Signal"),
    PacketSpec::new(UNUSED_32, One, false, "Unused"),
    PacketSpec::new(UNUSED_33, Two, false, "Unused"),
    PacketSpec::new(CHARGING_SOURCES, One, false, "Charging Sources Available"),
    PacketSpec::new(OI_MODE, One, false, "OI Mode"),
    PacketSpec::new(SONG_NUMBER, One, false, "Song Number"),
    PacketSpec::new(SONG_PLAYING, One, false, "Song Playing"),
    PacketSpec::new(STREAM_PACKETS, One, false, "Number of Stream Packets"),
    PacketSpec::new(REQUESTED_VELOCITY, Two, true, "Requested Velocity"),
    PacketSpec::new(REQUESTED_RADIUS, Two, true, "Requested Radius"),
    PacketSpec::new(REQUESTED_RIGHT_VELOCITY, Two, true, "Requested Right Velocity"),
    PacketSpec::new(REQUESTED_LEFT_VELOCITY, Two, true, "Requested Left Velocity"),
    PacketSpec::new(LEFT_ENCODER, Two, false, "Left Encoder Counts"),
    PacketSpec::new(RIGHT_ENCODER, Two, false, "Right Encoder Counts"),
    PacketSpec::new(LIGHT_BUMPER, One, false, "Light Bumper"),
    PacketSpec::new(LIGHT_BUMP_LEFT, Two, false, "Light Bump Left Signal"),
    PacketSpec::new(LIGHT_BUMP_FRONT_LEFT, Two, false, "Light Bump Front Left Signal"),
    PacketSpec::new(LIGHT_BUMP_CENTER_LEFT, Two, false, "Light Bump Center Left Signal"),
    PacketSpec::new(LIGHT_BUMP_CENTER_RIGHT, Two, false, "Light Bump Center Right Signal"),
    PacketSpec::new(LIGHT_BUMP_FRONT_RIGHT, Two, false, "Light Bump Front Right Signal"),
    PacketSpec::new(LIGHT_BUMP_RIGHT, Two, false, "Light Bump Right Signal"),
    PacketSpec::new(IR_LEFT, One, false, "Infrared Character Left"),
    PacketSpec::new(IR_RIGHT, One, false, "Infrared Character Right"),
    PacketSpec::new(LEFT_MOTOR_CURRENT, Two, true, "Left Motor Current"),
    PacketSpec::new(RIGHT_MOTOR_CURRENT, Two, true, "Right Motor Current"),
    PacketSpec::new(MAIN_BRUSH_MOTOR_CURRENT, Two, true, "Main Brush Motor Current"),
    PacketSpec::new(SIDE_BRUSH_MOTOR_CURRENT, Two, true, "Side Brush Motor Current"),
    PacketSpec::new(STASIS, One, false, "Stasis"),
];

const FIRST_PACKET: u8 = BUMPS_WHEEL_DROPS;

pub fn lookup(id: u8) -> Option<&'static PacketSpec> {
    let index = id.checked_sub(FIRST_PACKET)? as usize;
    CATALOG.get(index)
}

pub fn all() -> &'static [PacketSpec] {
    &CATALOG
}

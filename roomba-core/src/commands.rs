/// Open Interface commands sent to the robot and their wire encoding
use std::fmt;

use serde::Serialize;

pub const MAX_VELOCITY: i16 = 500;
pub const MAX_RADIUS: i16 = 2000;
/// Radius values the robot treats as "drive straight"
pub const RADIUS_STRAIGHT: i16 = i16::MAX;
pub const RADIUS_STRAIGHT_ALT: i16 = i16::MIN;
/// Turn in place counter-clockwise / clockwise
pub const TURN_CCW: i16 = 1;
pub const TURN_CW: i16 = -1;

pub mod opcode {
    pub const START: u8 = 128;
    pub const SAFE: u8 = 131;
    pub const FULL: u8 = 132;
    pub const POWER: u8 = 133;
    pub const DRIVE: u8 = 137;
    pub const SENSORS: u8 = 142;
    pub const SEEK_DOCK: u8 = 143;
    pub const STOP: u8 = 173;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Command {
    /// Start the Open Interface; also the way back into passive mode
    Start,
    Safe,
    Full,
    Power,
    SeekDock,
    /// Stop the Open Interface
    Stop,
    Drive { velocity: i16, radius: i16 },
    Sensors(u8),
}

impl Command {
    /// Drive command with velocity and radius clamped to what the robot accepts
    pub fn drive(velocity: i16, radius: i16) -> Self {
        let radius = match radius {
            RADIUS_STRAIGHT | RADIUS_STRAIGHT_ALT => radius,
            r => r.clamp(-MAX_RADIUS, MAX_RADIUS),
        };
        Command::Drive {
            velocity: velocity.clamp(-MAX_VELOCITY, MAX_VELOCITY),
            radius,
        }
    }

    /// Zero-velocity drive
    pub fn halt() -> Self {
        Command::Drive { velocity: 0, radius: 0 }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Command::Start => opcode::START,
            Command::Safe => opcode::SAFE,
            Command::Full => opcode::FULL,
            Command::Power => opcode::POWER,
            Command::SeekDock => opcode::SEEK_DOCK,
            Command::Stop => opcode::STOP,
            Command::Drive { .. } => opcode::DRIVE,
            Command::Sensors(_) => opcode::SENSORS,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode()];
        match *self {
            Command::Drive { velocity, radius } => {
                bytes.extend_from_slice(&velocity.to_be_bytes());
                bytes.extend_from_slice(&radius.to_be_bytes());
            }
            Command::Sensors(group) => bytes.push(group),
            _ => {}
        }
        bytes
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Drive { velocity, radius } => {
                write!(f, "Drive({} mm/s, r={})", velocity, radius)
            }
            Command::Sensors(group) => write!(f, "Sensors({})", group),
            other => write!(f, "{:?}", other),
        }
    }
}

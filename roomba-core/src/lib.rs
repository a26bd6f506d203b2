//! Roomba Core - Hardware-independent logic for the Roomba dashboard
//!
//! Decodes Open Interface sensor telemetry, projects it into the operator's
//! display state and encodes robot commands. Everything here can be tested on
//! the host without a robot attached.

pub mod commands;
pub mod config;
pub mod decoder;
pub mod display_state;
pub mod groups;
pub mod history;
pub mod labels;
pub mod packets;
pub mod projector;

pub use commands::Command;
pub use config::DashConfig;
pub use decoder::{decode, DecodeError, DecodedSample, Reading};
pub use display_state::DisplayState;
pub use groups::GroupSpec;
pub use packets::PacketSpec;
pub use projector::project;

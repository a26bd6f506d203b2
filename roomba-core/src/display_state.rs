/// Operator-visible state, updated by the projector and read by renderers
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::history::BatteryHistory;
use crate::labels::{UNKNOWN, UNKNOWN_MODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Temperature,
    Voltage,
    Current,
}

/// Small fixed-size value series, drawn as bar charts or table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Motion,
    Velocity,
    MotorCurrent,
    CliffSignal,
    LightBumpSignal,
}

impl Series {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Series::Motion => &["Enc(L)", "Enc(R)", "Rad(mm)", "Ang(deg)", "Dist(mm)"],
            Series::Velocity => &["Total", "Right", "Left"],
            Series::MotorCurrent => &["Left", "Right", "Main", "Side"],
            Series::CliffSignal => &["Left", "Front Left", "Front Right", "Right", "Wall"],
            Series::LightBumpSignal => &[
                "Left",
                "Front Left",
                "Center Left",
                "Center Right",
                "Front Right",
                "Right",
            ],
        }
    }
}

/// Groups of alert flags, one slot per sensor bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSet {
    /// Four cliff sensors plus the wall sensor
    Cliff,
    LightBumper,
    /// Bumps and wheel drops
    Wheel,
    Overcurrent,
    ChargingSources,
    VirtualWall,
}

impl FlagSet {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            FlagSet::Cliff => Series::CliffSignal.labels(),
            FlagSet::LightBumper => Series::LightBumpSignal.labels(),
            FlagSet::Wheel => &["Right Bump", "Left Bump", "Right Drop", "Left Drop"],
            FlagSet::Overcurrent => &["Side Brush", "Main Brush", "Right Wheel", "Left Wheel"],
            FlagSet::ChargingSources => &["Internal Charger", "Home Base"],
            FlagSet::VirtualWall => &["Virtual Wall"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSlot {
    Mode,
    ChargingState,
    Stasis,
    IrOmni,
    IrLeft,
    IrRight,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatteryGauge {
    pub charge_mah: i32,
    /// Cached across cycles; the capacity packet changes far less often than charge
    pub capacity_mah: i32,
    pub percent: f64,
}

impl BatteryGauge {
    pub fn set_charge(&mut self, charge: i32) -> f64 {
        self.charge_mah = charge;
        self.percent = battery_percent(self.charge_mah, self.capacity_mah);
        self.percent
    }

    pub fn set_capacity(&mut self, capacity: i32) {
        self.capacity_mah = capacity;
        self.percent = battery_percent(self.charge_mah, self.capacity_mah);
    }
}

/// `100 * charge / capacity`, rounded to two decimals; zero when capacity is unknown
pub fn battery_percent(charge: i32, capacity: i32) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    let percent = charge as f64 * 100.0 / capacity as f64;
    (percent * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayState {
    /// Wall-clock time of the last projected sample, ms since the epoch
    pub updated_at_ms: Option<u64>,
    pub samples_projected: u64,

    pub mode: String,
    pub charging_state: String,
    pub stasis: String,
    pub ir_omni: String,
    pub ir_left: String,
    pub ir_right: String,

    pub temperature_c: i32,
    pub voltage_mv: i32,
    pub current_ma: i32,
    pub dirt_percent: u8,

    pub battery: BatteryGauge,
    pub battery_history: BatteryHistory,

    pub motion: [i32; 5],
    pub velocity: [i32; 3],
    pub motor_currents: [i32; 4],
    pub cliff_signals: [i32; 5],
    pub light_bump_signals: [i32; 6],

    pub cliff_flags: [bool; 5],
    pub light_bumper_flags: [bool; 6],
    pub wheel_flags: [bool; 4],
    pub overcurrent_flags: [bool; 4],
    pub charging_source_flags: [bool; 2],
    pub virtual_wall_flag: [bool; 1],
}

impl DisplayState {
    pub fn new(history: HistoryConfig) -> Self {
        Self {
            updated_at_ms: None,
            samples_projected: 0,
            mode: UNKNOWN_MODE.to_string(),
            charging_state: UNKNOWN.to_string(),
            stasis: UNKNOWN.to_string(),
            ir_omni: UNKNOWN.to_string(),
            ir_left: UNKNOWN.to_string(),
            ir_right: UNKNOWN.to_string(),
            temperature_c: 0,
            voltage_mv: 0,
            current_ma: 0,
            dirt_percent: 0,
            battery: BatteryGauge::default(),
            battery_history: BatteryHistory::new(history),
            motion: [0; 5],
            velocity: [0; 3],
            motor_currents: [0; 4],
            cliff_signals: [0; 5],
            light_bump_signals: [0; 6],
            cliff_flags: [false; 5],
            light_bumper_flags: [false; 6],
            wheel_flags: [false; 4],
            overcurrent_flags: [false; 4],
            charging_source_flags: [false; 2],
            virtual_wall_flag: [false; 1],
        }
    }

    pub fn scalar(&self, slot: Scalar) -> i32 {
        match slot {
            Scalar::Temperature => self.temperature_c,
            Scalar::Voltage => self.voltage_mv,
            Scalar::Current => self.current_ma,
        }
    }

    pub fn scalar_mut(&mut self, slot: Scalar) -> &mut i32 {
        match slot {
            Scalar::Temperature => &mut self.temperature_c,
            Scalar::Voltage => &mut self.voltage_mv,
            Scalar::Current => &mut self.current_ma,
        }
    }

    pub fn series(&self, series: Series) -> &[i32] {
        match series {
            Series::Motion => &self.motion,
            Series::Velocity => &self.velocity,
            Series::MotorCurrent => &self.motor_currents,
            Series::CliffSignal => &self.cliff_signals,
            Series::LightBumpSignal => &self.light_bump_signals,
        }
    }

    pub fn series_mut(&mut self, series: Series) -> &mut [i32] {
        match series {
            Series::Motion => &mut self.motion,
            Series::Velocity => &mut self.velocity,
            Series::MotorCurrent => &mut self.motor_currents,
            Series::CliffSignal => &mut self.cliff_signals,
            Series::LightBumpSignal => &mut self.light_bump_signals,
        }
    }

    pub fn flags(&self, set: FlagSet) -> &[bool] {
        match set {
            FlagSet::Cliff => &self.cliff_flags,
            FlagSet::LightBumper => &self.light_bumper_flags,
            FlagSet::Wheel => &self.wheel_flags,
            FlagSet::Overcurrent => &self.overcurrent_flags,
            FlagSet::ChargingSources => &self.charging_source_flags,
            FlagSet::VirtualWall => &self.virtual_wall_flag,
        }
    }

    pub fn flags_mut(&mut self, set: FlagSet) -> &mut [bool] {
        match set {
            FlagSet::Cliff => &mut self.cliff_flags,
            FlagSet::LightBumper => &mut self.light_bumper_flags,
            FlagSet::Wheel => &mut self.wheel_flags,
            FlagSet::Overcurrent => &mut self.overcurrent_flags,
            FlagSet::ChargingSources => &mut self.charging_source_flags,
            FlagSet::VirtualWall => &mut self.virtual_wall_flag,
        }
    }

    pub fn label(&self, slot: LabelSlot) -> &str {
        match slot {
            LabelSlot::Mode => &self.mode,
            LabelSlot::ChargingState => &self.charging_state,
            LabelSlot::Stasis => &self.stasis,
            LabelSlot::IrOmni => &self.ir_omni,
            LabelSlot::IrLeft => &self.ir_left,
            LabelSlot::IrRight => &self.ir_right,
        }
    }

    pub fn label_mut(&mut self, slot: LabelSlot) -> &mut String {
        match slot {
            LabelSlot::Mode => &mut self.mode,
            LabelSlot::ChargingState => &mut self.charging_state,
            LabelSlot::Stasis => &mut self.stasis,
            LabelSlot::IrOmni => &mut self.ir_omni,
            LabelSlot::IrLeft => &mut self.ir_left,
            LabelSlot::IrRight => &mut self.ir_right,
        }
    }

    /// True when any cliff, bump, drop or overcurrent flag is raised
    pub fn has_alert(&self) -> bool {
        [FlagSet::Cliff, FlagSet::LightBumper, FlagSet::Wheel, FlagSet::Overcurrent]
            .iter()
            .any(|&set| self.flags(set).iter().any(|&f| f))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

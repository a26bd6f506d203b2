/// Human-readable labels for enumerated sensor codes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTable {
    OiMode,
    ChargingState,
    InfraredCode,
    Stasis,
}

pub const UNKNOWN: &str = "unknown";
pub const UNKNOWN_MODE: &str = "Unknown Mode";

const OI_MODES: &[(i32, &str)] = &[(0, "Off"), (1, "Passive"), (2, "Safe"), (3, "Full")];

const CHARGING_STATES: &[(i32, &str)] = &[
    (0, "Not Charging"),
    (1, "Reconditioning Charging"),
    (2, "Full Charging"),
    (3, "Trickle Charging"),
    (4, "Waiting"),
    (5, "Charging Fault Condition"),
];

const STASIS: &[(i32, &str)] = &[(0, "BWD/TURN"), (1, "FWD")];

// Remote, scheduling remote, virtual wall and both dock generations
const INFRARED_CODES: &[(i32, &str)] = &[
    (0, "None"),
    (129, "Left"),
    (130, "Forward"),
    (131, "Right"),
    (132, "Spot"),
    (133, "Max"),
    (134, "Small"),
    (135, "Medium"),
    (136, "Large / Clean"),
    (137, "Stop"),
    (138, "Power"),
    (139, "Arc Left"),
    (140, "Arc Right"),
    (141, "Stop"),
    (142, "Download"),
    (143, "Seek Dock"),
    (160, "Reserved"),
    (161, "Force Field"),
    (162, "Virtual Wall"),
    (164, "Green Buoy"),
    (165, "Green Buoy and Force Field"),
    (168, "Red Buoy"),
    (169, "Red Buoy and Force Field"),
    (172, "Red Buoy and Green Buoy"),
    (173, "Red Buoy, Green Buoy and Force Field"),
    (240, "Reserved"),
    (242, "Force Field"),
    (244, "Green Buoy"),
    (246, "Green Buoy and Force Field"),
    (248, "Red Buoy"),
    (250, "Red Buoy and Force Field"),
    (252, "Red Buoy and Green Buoy"),
    (254, "Red Buoy, Green Buoy and Force Field"),
];

impl LabelTable {
    fn entries(self) -> &'static [(i32, &'static str)] {
        match self {
            LabelTable::OiMode => OI_MODES,
            LabelTable::ChargingState => CHARGING_STATES,
            LabelTable::InfraredCode => INFRARED_CODES,
            LabelTable::Stasis => STASIS,
        }
    }

    pub fn lookup(self, code: i32) -> Option<&'static str> {
        self.entries()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Label for `code`, or this table's placeholder for codes it does not know
    pub fn label_or_unknown(self, code: i32) -> &'static str {
        self.lookup(code).unwrap_or(match self {
            LabelTable::OiMode => UNKNOWN_MODE,
            _ => UNKNOWN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(LabelTable::OiMode.lookup(2), Some("Safe"));
        assert_eq!(LabelTable::ChargingState.lookup(3), Some("Trickle Charging"));
        assert_eq!(LabelTable::InfraredCode.lookup(143), Some("Seek Dock"));
        assert_eq!(LabelTable::Stasis.lookup(1), Some("FWD"));
    }

    #[test]
    fn test_unknown_codes_get_placeholder() {
        assert_eq!(LabelTable::OiMode.label_or_unknown(9), UNKNOWN_MODE);
        assert_eq!(LabelTable::ChargingState.label_or_unknown(77), UNKNOWN);
        assert_eq!(LabelTable::InfraredCode.label_or_unknown(1), UNKNOWN);
        assert_eq!(LabelTable::Stasis.label_or_unknown(-1), UNKNOWN);
    }
}

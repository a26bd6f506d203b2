/// Telemetry decoder
/// Walks a raw group payload against the group's ordered packet list

use std::fmt;
use std::time::SystemTime;

use crate::groups::{self, GroupSpec};
use crate::packets;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    UnknownGroup(u8),
    UnknownPacket { group: u8, packet: u8 },
    /// Payload ended before every packet in the group was read
    ShortPayload { group: u8, expected: usize, actual: usize },
    /// Payload carried more bytes than the group declares
    TrailingBytes { group: u8, expected: usize, actual: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownGroup(group) => write!(f, "unknown sensor group {}", group),
            DecodeError::UnknownPacket { group, packet } => {
                write!(f, "group {} references unknown packet {}", group, packet)
            }
            DecodeError::ShortPayload { group, expected, actual } => write!(
                f,
                "short payload for group {}: expected {} bytes, got {}",
                group, expected, actual
            ),
            DecodeError::TrailingBytes { group, expected, actual } => write!(
                f,
                "oversized payload for group {}: expected {} bytes, got {}",
                group, expected, actual
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// One decoded packet value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub packet: u8,
    pub value: i32,
}

/// Values decoded from one group read, in wire order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    pub group: u8,
    pub readings: Vec<Reading>,
    pub decoded_at: SystemTime,
}

impl DecodedSample {
    pub fn get(&self, packet: u8) -> Option<i32> {
        self.readings.iter().find(|r| r.packet == packet).map(|r| r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Decode a payload read from one of the catalogued groups
pub fn decode(group: u8, raw: &[u8]) -> Result<DecodedSample, DecodeError> {
    let spec = groups::lookup(group).ok_or(DecodeError::UnknownGroup(group))?;
    decode_group(spec, raw)
}

pub fn decode_group(spec: &GroupSpec, raw: &[u8]) -> Result<DecodedSample, DecodeError> {
    let mut readings = Vec::with_capacity(spec.packet_ids.len());
    let mut cursor = 0usize;

    for &id in spec.packet_ids {
        let packet = packets::lookup(id).ok_or(DecodeError::UnknownPacket {
            group: spec.id,
            packet: id,
        })?;
        let end = cursor + packet.width.bytes();
        let bytes = raw.get(cursor..end).ok_or(DecodeError::ShortPayload {
            group: spec.id,
            expected: spec.total_width(),
            actual: raw.len(),
        })?;

        readings.push(Reading {
            packet: id,
            value: packet.interpret(bytes),
        });
        cursor = end;
    }

    if cursor != raw.len() {
        return Err(DecodeError::TrailingBytes {
            group: spec.id,
            expected: cursor,
            actual: raw.len(),
        });
    }

    Ok(DecodedSample {
        group: spec.id,
        readings,
        decoded_at: SystemTime::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{SENSOR_GROUP_101, SENSOR_GROUP_3, SENSOR_GROUP_6};
    use crate::packets::*;
    use proptest::prelude::*;

    fn group_3_payload() -> Vec<u8> {
        vec![
            2,          // charging state: full charging
            0x3A, 0x98, // voltage 15000 mV
            0xFF, 0x9C, // current -100 mA
            0xE7,       // temperature -25 C (signed)
            0x05, 0x46, // charge 1350 mAh
            0x0A, 0x8C, // capacity 2700 mAh
        ]
    }

    #[test]
    fn test_decode_group_3() {
        let sample = decode(SENSOR_GROUP_3, &group_3_payload()).unwrap();

        assert_eq!(sample.group, SENSOR_GROUP_3);
        assert_eq!(sample.len(), 6);
        assert_eq!(sample.get(CHARGING_STATE), Some(2));
        assert_eq!(sample.get(VOLTAGE), Some(15000));
        assert_eq!(sample.get(CURRENT), Some(-100));
        assert_eq!(sample.get(TEMPERATURE), Some(-25));
        assert_eq!(sample.get(BATTERY_CHARGE), Some(1350));
        assert_eq!(sample.get(BATTERY_CAPACITY), Some(2700));
    }

    #[test]
    fn test_readings_follow_wire_order() {
        let sample = decode(SENSOR_GROUP_3, &group_3_payload()).unwrap();
        let ids: Vec<u8> = sample.iter().map(|r| r.packet).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25, 26]);
    }

    #[test]
    fn test_short_payload_fails() {
        let mut payload = group_3_payload();
        payload.pop();

        let err = decode(SENSOR_GROUP_3, &payload).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ShortPayload { group: SENSOR_GROUP_3, expected: 10, actual: 9 }
        );
    }

    #[test]
    fn test_empty_payload_fails() {
        assert!(matches!(
            decode(SENSOR_GROUP_6, &[]),
            Err(DecodeError::ShortPayload { expected: 52, actual: 0, .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut payload = group_3_payload();
        payload.push(0);

        assert!(matches!(
            decode(SENSOR_GROUP_3, &payload),
            Err(DecodeError::TrailingBytes { expected: 10, actual: 11, .. })
        ));
    }

    #[test]
    fn test_unknown_group() {
        assert_eq!(decode(42, &[0; 4]), Err(DecodeError::UnknownGroup(42)));
    }

    #[test]
    fn test_unknown_packet_in_custom_group() {
        static BROKEN: GroupSpec = GroupSpec { id: 200, packet_ids: &[7, 99] };
        assert_eq!(
            decode_group(&BROKEN, &[0, 0]),
            Err(DecodeError::UnknownPacket { group: 200, packet: 99 })
        );
    }

    #[test]
    fn test_motor_currents_are_signed() {
        let mut payload = vec![0u8; 28];
        // packets 54..57 start after 43,44 (4) + 45 (1) + 46..51 (12) + 52,53 (2)
        payload[19] = 0xFF;
        payload[20] = 0x9C;
        let sample = decode(SENSOR_GROUP_101, &payload).unwrap();
        assert_eq!(sample.get(LEFT_MOTOR_CURRENT), Some(-100));
    }

    proptest! {
        #[test]
        fn prop_one_value_per_packet(group_index in 0usize..11, seed in any::<u8>()) {
            let spec = &groups::all()[group_index];
            let payload: Vec<u8> = (0..spec.total_width())
                .map(|i| seed.wrapping_add(i as u8))
                .collect();

            let sample = decode_group(spec, &payload).unwrap();
            let ids: Vec<u8> = sample.iter().map(|r| r.packet).collect();
            prop_assert_eq!(ids, spec.packet_ids.to_vec());
        }

        #[test]
        fn prop_truncated_payload_always_fails(group_index in 0usize..11, cut in 1usize..80) {
            let spec = &groups::all()[group_index];
            let width = spec.total_width();
            let len = width.saturating_sub(cut);
            let payload = vec![0xAAu8; len];

            let is_short = matches!(
                decode_group(spec, &payload),
                Err(DecodeError::ShortPayload { .. })
            );
            prop_assert!(is_short);
        }

        #[test]
        fn prop_decode_is_idempotent(payload in proptest::collection::vec(any::<u8>(), 52)) {
            let first = decode(SENSOR_GROUP_6, &payload).unwrap();
            let second = decode(SENSOR_GROUP_6, &payload).unwrap();
            prop_assert_eq!(first.readings, second.readings);
        }
    }
}

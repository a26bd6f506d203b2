/// Sensor group composer
/// A group read returns the concatenation of its packets' raw bytes, in the order listed here

use crate::packets::{self, PacketSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub id: u8,
    pub packet_ids: &'static [u8],
}

impl GroupSpec {
    /// Sum of the packet widths, i.e. the payload length the robot returns for this group
    pub fn total_width(&self) -> usize {
        self.packets().map(|p| p.width.bytes()).sum()
    }

    /// Packet specs in wire order. Ids missing from the catalog are skipped here;
    /// the decoder reports them as errors.
    pub fn packets(&self) -> impl Iterator<Item = &'static PacketSpec> + '_ {
        self.packet_ids.iter().filter_map(|&id| packets::lookup(id))
    }
}

pub const SENSOR_GROUP_0: u8 = 0;
pub const SENSOR_GROUP_1: u8 = 1;
pub const SENSOR_GROUP_2: u8 = 2;
pub const SENSOR_GROUP_3: u8 = 3;
pub const SENSOR_GROUP_4: u8 = 4;
pub const SENSOR_GROUP_5: u8 = 5;
pub const SENSOR_GROUP_6: u8 = 6;
/// Advertised as "every packet", but on real hardware this read does not return
/// what the documentation promises. Poll 6 and 101 separately instead.
pub const SENSOR_GROUP_100: u8 = 100;
pub const SENSOR_GROUP_101: u8 = 101;
pub const SENSOR_GROUP_106: u8 = 106;
pub const SENSOR_GROUP_107: u8 = 107;

/// Groups polled every cycle. Together they cover packets 7..=58.
pub const DEFAULT_POLL_GROUPS: [u8; 2] = [SENSOR_GROUP_6, SENSOR_GROUP_101];

const PACKETS_7_TO_16: [u8; 10] = [7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
const PACKETS_17_TO_20: [u8; 4] = [17, 18, 19, 20];
const PACKETS_21_TO_26: [u8; 6] = [21, 22, 23, 24, 25, 26];
const PACKETS_27_TO_34: [u8; 8] = [27, 28, 29, 30, 31, 32, 33, 34];
const PACKETS_35_TO_42: [u8; 8] = [35, 36, 37, 38, 39, 40, 41, 42];

const PACKETS_7_TO_26: [u8; 20] = [
    7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
];

const PACKETS_7_TO_42: [u8; 36] = [
    7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30,
    31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42,
];

const PACKETS_7_TO_58: [u8; 52] = [
    7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30,
    31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53,
    54, 55, 56, 57, 58,
];

const PACKETS_43_TO_58: [u8; 16] = [43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58];
const PACKETS_46_TO_51: [u8; 6] = [46, 47, 48, 49, 50, 51];
const PACKETS_54_TO_58: [u8; 5] = [54, 55, 56, 57, 58];

static GROUPS: [GroupSpec; 11] = [
    GroupSpec { id: SENSOR_GROUP_0, packet_ids: &PACKETS_7_TO_26 },
    GroupSpec { id: SENSOR_GROUP_1, packet_ids: &PACKETS_7_TO_16 },
    GroupSpec { id: SENSOR_GROUP_2, packet_ids: &PACKETS_17_TO_20 },
    GroupSpec { id: SENSOR_GROUP_3, packet_ids: &PACKETS_21_TO_26 },
    GroupSpec { id: SENSOR_GROUP_4, packet_ids: &PACKETS_27_TO_34 },
    GroupSpec { id: SENSOR_GROUP_5, packet_ids: &PACKETS_35_TO_42 },
    GroupSpec { id: SENSOR_GROUP_6, packet_ids: &PACKETS_7_TO_42 },
    GroupSpec { id: SENSOR_GROUP_100, packet_ids: &PACKETS_7_TO_58 },
    GroupSpec { id: SENSOR_GROUP_101, packet_ids: &PACKETS_43_TO_58 },
    GroupSpec { id: SENSOR_GROUP_106, packet_ids: &PACKETS_46_TO_51 },
    GroupSpec { id: SENSOR_GROUP_107, packet_ids: &PACKETS_54_TO_58 },
];

pub fn lookup(id: u8) -> Option<&'static GroupSpec> {
    GROUPS.iter().find(|g| g.id == id)
}

pub fn all() -> &'static [GroupSpec] {
    &GROUPS
}

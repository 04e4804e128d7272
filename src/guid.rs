use uuid::{Builder, Uuid};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A GUID in packet representation ([MS-DTYP] section 2.3.4.2): a 32-bit
/// `Data1`, two 16-bit fields, and eight bytes of `Data4` (the first two of
/// which carry the variant/clock-sequence bits for version-1 UUIDs, the
/// remaining six the node/MAC address). Backed by [`uuid::Uuid`] for storage;
/// the rendering this format needs (braced uppercase, MS-SHLLINK's specific
/// version/variant names, the version-1 timestamp rebased onto the FILETIME
/// epoch) has no equivalent in `uuid`'s own `Display`/accessor methods, so
/// those are computed here from the raw byte groups instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Guid(#[cfg_attr(feature = "serde", serde(serialize_with = "serialize_uuid"))] Uuid);

#[cfg(feature = "serde")]
fn serialize_uuid<S: serde::Serializer>(uuid: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&Guid(*uuid).braced_string())
}

impl Default for Guid {
    fn default() -> Self {
        Self(Uuid::nil())
    }
}

impl Guid {
    pub const SIZE: usize = 16;

    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        Self(Builder::from_bytes_le(*bytes).into_uuid())
    }

    /// The packet-representation byte groups, recovered from the
    /// little-endian field layout `Builder::from_bytes_le` stored them in.
    fn groups(&self) -> (u32, u16, u16, [u8; 8]) {
        let le_bytes = self.0.to_bytes_le();
        (
            u32::from_le_bytes(le_bytes[0..4].try_into().unwrap()),
            u16::from_le_bytes(le_bytes[4..6].try_into().unwrap()),
            u16::from_le_bytes(le_bytes[6..8].try_into().unwrap()),
            le_bytes[8..16].try_into().unwrap(),
        )
    }

    fn data1(&self) -> u32 {
        self.groups().0
    }

    fn data2(&self) -> u16 {
        self.groups().1
    }

    fn data3(&self) -> u16 {
        self.groups().2
    }

    fn data4(&self) -> [u8; 8] {
        self.groups().3
    }

    /// `{DDDDDDDD-DDDD-DDDD-DDDD-DDDDDDDDDDDD}` uppercase hex, matching the
    /// legacy formatter's rendering rather than the generic `uuid` crate
    /// Display implementation (which lowercases and omits braces).
    pub fn braced_string(&self) -> String {
        let (data1, data2, data3, data4) = self.groups();
        format!(
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            data1,
            data2,
            data3,
            data4[0],
            data4[1],
            data4[2],
            data4[3],
            data4[4],
            data4[5],
            data4[6],
            data4[7],
        )
    }

    /// UUID version, extracted from `data3 >> 12`.
    pub fn version(&self) -> u16 {
        self.data3() >> 12
    }

    pub fn version_name(&self) -> String {
        match self.version() {
            1 => "1 - ITU time based".to_string(),
            2 => "2 - DCE security version".to_string(),
            3 => "3 - ITU name based MD5".to_string(),
            4 => "4 - ITU random number".to_string(),
            5 => "5 - ITU name based SHA1".to_string(),
            n => format!("{n} - Unknown version"),
        }
    }

    /// UUID variant, extracted from the top bits of `data4[0]`.
    pub fn variant_name(&self) -> &'static str {
        match self.data4()[0] >> 6 {
            0 | 1 => "NCS",
            2 => "ITU",
            _ => "Microsoft",
        }
    }

    /// Version-1 clock sequence: `((data4[0] & 0x3F) << 8) | data4[1]`.
    pub fn clock_sequence(&self) -> u16 {
        let data4 = self.data4();
        (((data4[0] & 0x3F) as u16) << 8) | data4[1] as u16
    }

    /// Node (the last six bytes of `data4`), formatted as a MAC address.
    pub fn node_string(&self) -> String {
        let data4 = self.data4();
        format!(
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            data4[2], data4[3], data4[4], data4[5], data4[6], data4[7]
        )
    }

    /// Reconstructs the 60-bit version-1 timestamp and converts it through
    /// [`crate::filetime::filetime_to_iso`] by rebasing it from the Gregorian
    /// calendar reform epoch (1582-10-15) onto the FILETIME epoch
    /// (1601-01-01): subtract `10^7 * 86400 * 5113` 100-ns ticks, the
    /// number of seconds between the two epochs scaled to FILETIME units.
    pub fn time_as_filetime(&self) -> i64 {
        const EPOCH_ADJUSTMENT: i64 = 10_000_000 * 86_400 * 5113;
        let (data1, data2, data3, _) = self.groups();
        let timestamp =
            (data1 as u64) | ((data2 as u64) << 32) | (((data3 & 0x0FFF) as u64) << 48);
        timestamp as i64 - EPOCH_ADJUSTMENT
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.braced_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braced_string_matches_ms_shllink_clsid() {
        // {00021401-0000-0000-C000-000000000046}
        let bytes: [u8; 16] = [
            0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x46,
        ];
        let guid = Guid::from_bytes(&bytes);
        assert_eq!(guid.braced_string(), "{00021401-0000-0000-C000-000000000046}");
    }

    #[test]
    fn version_and_variant_decode() {
        let mut bytes = [0u8; 16];
        // data3 top nibble = version 1
        bytes[7] = 0x10;
        // data4[0] top two bits = 10 -> Microsoft variant... wait ITU is 10
        bytes[8] = 0b1000_0000;
        let guid = Guid::from_bytes(&bytes);
        assert_eq!(guid.version(), 1);
        assert_eq!(guid.variant_name(), "ITU");
    }
}

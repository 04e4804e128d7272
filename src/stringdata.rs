#[allow(unused)]
use log::{debug, trace};

use crate::bytereader::{read_u16_le, read_u16_le as read_count};
use crate::Error;

/// One of the five optional StringData entries (Name, RelativePath,
/// WorkingDir, Arguments, IconLocation).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StringDataEntry {
    pub count_chars: u16,
    pub value: String,
}

impl StringDataEntry {
    /// Reads one entry at `off`: a u16 character count followed by that many
    /// characters (UTF-16LE if `unicode`, ANSI otherwise). Returns the entry
    /// plus the number of bytes it occupied on the wire.
    pub fn read(buf: &[u8], off: usize, unicode: bool) -> Result<(Self, usize), Error> {
        let count_chars = read_count(buf, off).map_err(|_| Error::TruncatedStringData {
            pos: off,
            needed: 2,
            available: buf.len().saturating_sub(off),
        })?;
        let n = count_chars as usize;

        let (value, consumed) = if unicode {
            let mut units = Vec::with_capacity(n);
            for i in 0..n {
                let unit = read_u16_le(buf, off + 2 + i * 2).map_err(|_| Error::TruncatedStringData {
                    pos: off + 2 + i * 2,
                    needed: 2,
                    available: buf.len().saturating_sub(off + 2 + i * 2),
                })?;
                units.push(unit);
            }
            (String::from_utf16_lossy(&units), 2 + n * 2)
        } else {
            let bytes = buf
                .get(off + 2..off + 2 + n)
                .ok_or(Error::TruncatedStringData {
                    pos: off + 2,
                    needed: n,
                    available: buf.len().saturating_sub(off + 2),
                })?;
            let s: String = bytes.iter().map(|&b| b as char).collect();
            (s, 2 + n)
        };

        trace!("string data entry: {count_chars} chars -> {value:?}");
        Ok((Self { count_chars, value }, consumed))
    }
}

/// Display-time cap at 299 characters; the decoder stores the string in
/// full, matching the design decision that the cap is a UI convenience and
/// not a format rule.
pub fn display_capped(s: &str) -> String {
    if s.chars().count() > 299 {
        s.chars().take(299).collect()
    } else {
        s.to_string()
    }
}

/// The five optional StringData slots, each gated by bits 2..6 of the header
/// flags in this fixed order: Name, RelativePath, WorkingDir, Arguments,
/// IconLocation.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StringData {
    pub name: Option<StringDataEntry>,
    pub relative_path: Option<StringDataEntry>,
    pub working_dir: Option<StringDataEntry>,
    pub arguments: Option<StringDataEntry>,
    pub icon_location: Option<StringDataEntry>,
    /// Total on-wire bytes consumed by all present entries.
    pub size: u32,
}

impl StringData {
    pub fn read(buf: &[u8], start: usize, flags_bits: u32, unicode: bool) -> Result<Self, Error> {
        let mut pos = start;
        let mut total = 0u32;
        debug!("string data start at 0x{start:x}, unicode={unicode}");

        macro_rules! slot {
            ($bit:expr) => {{
                if flags_bits & (1 << $bit) != 0 {
                    let (entry, consumed) = StringDataEntry::read(buf, pos, unicode)?;
                    pos += consumed;
                    total += consumed as u32;
                    Some(entry)
                } else {
                    None
                }
            }};
        }

        let name = slot!(2);
        let relative_path = slot!(3);
        let working_dir = slot!(4);
        let arguments = slot!(5);
        let icon_location = slot!(6);

        Ok(Self {
            name,
            relative_path,
            working_dir,
            arguments,
            icon_location,
            size: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ansi_entry(s: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(s.len() as u16).to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
        buf
    }

    #[test]
    fn reads_ansi_entry() {
        let buf = ansi_entry("hello");
        let (entry, consumed) = StringDataEntry::read(&buf, 0, false).unwrap();
        assert_eq!(entry.value, "hello");
        assert_eq!(consumed, 7);
    }

    #[test]
    fn reads_unicode_entry() {
        let mut buf = Vec::new();
        let units: Vec<u16> = "hi".encode_utf16().collect();
        buf.extend_from_slice(&(units.len() as u16).to_le_bytes());
        for u in &units {
            buf.extend_from_slice(&u.to_le_bytes());
        }
        let (entry, consumed) = StringDataEntry::read(&buf, 0, true).unwrap();
        assert_eq!(entry.value, "hi");
        assert_eq!(consumed, 2 + 4);
    }

    #[test]
    fn reads_only_flagged_slots_in_order() {
        let mut buf = Vec::new();
        buf.extend(ansi_entry("Name"));
        buf.extend(ansi_entry("Args"));
        // bit2 (Name) and bit5 (Arguments) set
        let flags = (1 << 2) | (1 << 5);
        let data = StringData::read(&buf, 0, flags, false).unwrap();
        assert_eq!(data.name.unwrap().value, "Name");
        assert!(data.relative_path.is_none());
        assert_eq!(data.arguments.unwrap().value, "Args");
        assert_eq!(data.size as usize, "Name".len() + 2 + "Args".len() + 2);
    }
}

#[allow(unused)]
use log::{debug, trace, warn};

use crate::bytereader::{read_u16_le, read_u32_le};
use crate::guid::Guid;
use crate::Error;

/// A block at or above this size aborts ExtraData parsing; the record is
/// still usable with whatever blocks were already decoded.
const MAX_BLOCK_SIZE: u32 = 4096;

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtraDataKind {
    EnvironmentVariable,
    Console,
    Tracker,
    ConsoleFE,
    SpecialFolder,
    Darwin,
    IconEnvironment,
    Shim,
    PropertyStore,
    VistaAndAboveIdList,
    KnownFolder,
}

impl ExtraDataKind {
    fn from_signature(sig: u32) -> Option<Self> {
        Some(match sig {
            0xA0000001 => Self::EnvironmentVariable,
            0xA0000002 => Self::Console,
            0xA0000003 => Self::Tracker,
            0xA0000004 => Self::ConsoleFE,
            0xA0000005 => Self::SpecialFolder,
            0xA0000006 => Self::Darwin,
            0xA0000007 => Self::IconEnvironment,
            0xA0000008 => Self::Shim,
            0xA0000009 => Self::PropertyStore,
            0xA000000A => Self::VistaAndAboveIdList,
            0xA000000B => Self::KnownFolder,
            _ => return None,
        })
    }
}

/// The TrackerDataBlock (section 2.5.10): data passed to the Windows Link
/// Tracking service to resolve a moved target.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackerData {
    pub length: u32,
    pub version: u32,
    pub machine_id: String,
    pub droid1: Guid,
    pub droid2: Guid,
    pub droid_birth1: Guid,
    pub droid_birth2: Guid,
}

/// The SpecialFolderDataBlock (section 2.5.9).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpecialFolderData {
    pub special_folder_id: u32,
    pub offset: u32,
}

/// The ShimDataBlock (section 2.5.8): only the layer name is retained.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShimData {
    pub layer_name: String,
}

/// The KnownFolderDataBlock (section 2.5.6).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KnownFolderData {
    pub known_folder_id: Guid,
    pub offset: u32,
}

/// The VistaAndAboveIDListDataBlock (section 2.5.11): only the ItemID count
/// is retained, matching the counting-only treatment TargetIDList gets.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VistaAndAboveIdListData {
    pub num_item_ids: u32,
}

/// Raw metadata for a recognized signature whose payload this version does
/// not decode beyond size and signature (EnvironmentVariable, Console,
/// ConsoleFE, Darwin, IconEnvironment) and for unrecognized signatures.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawBlockMeta {
    pub size: u32,
    pub signature: u32,
}

/// One decoded ExtraData block.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtraDataBlock {
    EnvironmentVariable(RawBlockMeta),
    Console(RawBlockMeta),
    Tracker(TrackerData),
    ConsoleFE(RawBlockMeta),
    SpecialFolder(SpecialFolderData),
    Darwin(RawBlockMeta),
    IconEnvironment(RawBlockMeta),
    Shim(ShimData),
    /// Property-store payload parsing is explicitly deferred; only a store
    /// count (always 0 in this version) is kept.
    PropertyStore { num_stores: u32 },
    VistaAndAboveIdList(VistaAndAboveIdListData),
    KnownFolder(KnownFolderData),
    Unknown(RawBlockMeta),
}

/// The decoded ExtraData section: an ordered list of blocks plus whichever
/// u32 value terminated the loop.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtraData {
    pub blocks: Vec<ExtraDataBlock>,
    pub terminal: u32,
    pub size: u32,
}

impl ExtraData {
    pub fn types_present(&self) -> std::collections::HashSet<ExtraDataKind> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ExtraDataBlock::EnvironmentVariable(_) => Some(ExtraDataKind::EnvironmentVariable),
                ExtraDataBlock::Console(_) => Some(ExtraDataKind::Console),
                ExtraDataBlock::Tracker(_) => Some(ExtraDataKind::Tracker),
                ExtraDataBlock::ConsoleFE(_) => Some(ExtraDataKind::ConsoleFE),
                ExtraDataBlock::SpecialFolder(_) => Some(ExtraDataKind::SpecialFolder),
                ExtraDataBlock::Darwin(_) => Some(ExtraDataKind::Darwin),
                ExtraDataBlock::IconEnvironment(_) => Some(ExtraDataKind::IconEnvironment),
                ExtraDataBlock::Shim(_) => Some(ExtraDataKind::Shim),
                ExtraDataBlock::PropertyStore { .. } => Some(ExtraDataKind::PropertyStore),
                ExtraDataBlock::VistaAndAboveIdList(_) => Some(ExtraDataKind::VistaAndAboveIdList),
                ExtraDataBlock::KnownFolder(_) => Some(ExtraDataKind::KnownFolder),
                ExtraDataBlock::Unknown(_) => None,
            })
            .collect()
    }

    /// Reads the ExtraData loop starting at `start`, stopping at the first
    /// terminator (`block_size < 4`) or an oversized block (`>= 4096`,
    /// recoverable: parsing simply stops there).
    pub fn read(buf: &[u8], start: usize) -> Result<Self, Error> {
        let mut pos = start;
        let mut blocks = Vec::new();

        loop {
            let block_size = match read_u32_le(buf, pos) {
                Ok(v) => v,
                Err(_) => break,
            };
            if block_size < 4 {
                let consumed = (pos + 4 - start) as u32;
                return Ok(Self {
                    blocks,
                    terminal: block_size,
                    size: consumed,
                });
            }
            if block_size >= MAX_BLOCK_SIZE {
                warn!("ExtraData block at 0x{pos:x} is oversized ({block_size} bytes); stopping");
                let consumed = (pos - start) as u32;
                return Ok(Self {
                    blocks,
                    terminal: 0,
                    size: consumed,
                });
            }

            let signature = read_u32_le(buf, pos + 4)?;
            let payload_start = pos + 8;
            trace!("extra data block: size={block_size} sig=0x{signature:08x}");

            blocks.push(decode_block(buf, payload_start, block_size, signature));
            pos += block_size as usize;
        }

        let consumed = (pos - start) as u32;
        Ok(Self {
            blocks,
            terminal: 0,
            size: consumed,
        })
    }
}

fn decode_block(buf: &[u8], payload_start: usize, block_size: u32, signature: u32) -> ExtraDataBlock {
    let meta = RawBlockMeta {
        size: block_size,
        signature,
    };

    match ExtraDataKind::from_signature(signature) {
        Some(ExtraDataKind::Tracker) => decode_tracker(buf, payload_start)
            .map(ExtraDataBlock::Tracker)
            .unwrap_or_else(|e| {
                warn!("TrackerData block malformed, keeping raw metadata: {e}");
                ExtraDataBlock::Unknown(meta)
            }),
        Some(ExtraDataKind::SpecialFolder) => decode_special_folder(buf, payload_start)
            .map(ExtraDataBlock::SpecialFolder)
            .unwrap_or_else(|e| {
                warn!("SpecialFolderData block malformed, keeping raw metadata: {e}");
                ExtraDataBlock::Unknown(meta)
            }),
        Some(ExtraDataKind::Shim) => {
            let payload_len = block_size.saturating_sub(8) as usize;
            ExtraDataBlock::Shim(ShimData {
                layer_name: decode_shim(buf, payload_start, payload_len),
            })
        }
        Some(ExtraDataKind::KnownFolder) => decode_known_folder(buf, payload_start)
            .map(ExtraDataBlock::KnownFolder)
            .unwrap_or_else(|e| {
                warn!("KnownFolderData block malformed, keeping raw metadata: {e}");
                ExtraDataBlock::Unknown(meta)
            }),
        Some(ExtraDataKind::VistaAndAboveIdList) => {
            let payload_len = block_size.saturating_sub(8) as usize;
            ExtraDataBlock::VistaAndAboveIdList(VistaAndAboveIdListData {
                num_item_ids: count_vista_id_list(buf, payload_start, payload_len),
            })
        }
        Some(ExtraDataKind::PropertyStore) => ExtraDataBlock::PropertyStore { num_stores: 0 },
        Some(ExtraDataKind::EnvironmentVariable) => ExtraDataBlock::EnvironmentVariable(meta),
        Some(ExtraDataKind::Console) => ExtraDataBlock::Console(meta),
        Some(ExtraDataKind::ConsoleFE) => ExtraDataBlock::ConsoleFE(meta),
        Some(ExtraDataKind::Darwin) => ExtraDataBlock::Darwin(meta),
        Some(ExtraDataKind::IconEnvironment) => ExtraDataBlock::IconEnvironment(meta),
        None => ExtraDataBlock::Unknown(meta),
    }
}

fn guid_at(buf: &[u8], off: usize) -> Result<Guid, Error> {
    let bytes: [u8; 16] = buf
        .get(off..off + 16)
        .ok_or(Error::Truncated {
            pos: off,
            needed: 16,
            available: buf.len().saturating_sub(off),
        })?
        .try_into()
        .unwrap();
    Ok(Guid::from_bytes(&bytes))
}

fn decode_tracker(buf: &[u8], off: usize) -> Result<TrackerData, Error> {
    let length = read_u32_le(buf, off)?;
    let version = read_u32_le(buf, off + 4)?;
    let machine_id_bytes = buf.get(off + 8..off + 24).ok_or(Error::Truncated {
        pos: off + 8,
        needed: 16,
        available: buf.len().saturating_sub(off + 8),
    })?;
    let nul = machine_id_bytes.iter().position(|&b| b == 0).unwrap_or(16);
    let machine_id = machine_id_bytes[..nul].iter().map(|&b| b as char).collect();

    Ok(TrackerData {
        length,
        version,
        machine_id,
        droid1: guid_at(buf, off + 24)?,
        droid2: guid_at(buf, off + 40)?,
        droid_birth1: guid_at(buf, off + 56)?,
        droid_birth2: guid_at(buf, off + 72)?,
    })
}

fn decode_special_folder(buf: &[u8], off: usize) -> Result<SpecialFolderData, Error> {
    Ok(SpecialFolderData {
        special_folder_id: read_u32_le(buf, off)?,
        offset: read_u32_le(buf, off + 4)?,
    })
}

fn decode_known_folder(buf: &[u8], off: usize) -> Result<KnownFolderData, Error> {
    Ok(KnownFolderData {
        known_folder_id: guid_at(buf, off)?,
        offset: read_u32_le(buf, off + 16)?,
    })
}

/// Up to 600 UTF-16LE code units, matching the layer-name size cap imposed
/// by the reference decoder.
fn decode_shim(buf: &[u8], off: usize, payload_len: usize) -> String {
    let max_units = (payload_len / 2).min(600);
    let mut units = Vec::with_capacity(max_units);
    for i in 0..max_units {
        match read_u16_le(buf, off + i * 2) {
            Ok(0) | Err(_) => break,
            Ok(u) => units.push(u),
        }
    }
    String::from_utf16_lossy(&units)
}

fn count_vista_id_list(buf: &[u8], off: usize, payload_len: usize) -> u32 {
    let mut pos = off;
    let end = off + payload_len;
    let mut count = 0u32;
    while pos + 2 <= end {
        let Ok(item_size) = read_u16_le(buf, pos) else {
            break;
        };
        if item_size == 0 {
            break;
        }
        pos += item_size as usize;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_only_stream_yields_no_blocks() {
        let buf = 0u32.to_le_bytes().to_vec();
        let extra = ExtraData::read(&buf, 0).unwrap();
        assert!(extra.blocks.is_empty());
        assert_eq!(extra.terminal, 0);
    }

    #[test]
    fn decodes_special_folder_block() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&16u32.to_le_bytes()); // block_size
        buf.extend_from_slice(&0xA0000005u32.to_le_bytes());
        buf.extend_from_slice(&3u32.to_le_bytes()); // special_folder_id
        buf.extend_from_slice(&0x20u32.to_le_bytes()); // offset
        buf.extend_from_slice(&0u32.to_le_bytes()); // terminator

        let extra = ExtraData::read(&buf, 0).unwrap();
        assert_eq!(extra.blocks.len(), 1);
        match &extra.blocks[0] {
            ExtraDataBlock::SpecialFolder(sf) => {
                assert_eq!(sf.special_folder_id, 3);
                assert_eq!(sf.offset, 0x20);
            }
            other => panic!("expected SpecialFolder, got {other:?}"),
        }
        assert!(extra.types_present().contains(&ExtraDataKind::SpecialFolder));
    }

    #[test]
    fn oversized_block_stops_parsing_without_failing() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&4096u32.to_le_bytes());
        let extra = ExtraData::read(&buf, 0).unwrap();
        assert!(extra.blocks.is_empty());
    }

    #[test]
    fn decodes_tracker_block() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0x60u32.to_le_bytes()); // block_size
        buf.extend_from_slice(&0xA0000003u32.to_le_bytes());
        buf.extend_from_slice(&0x58u32.to_le_bytes()); // length
        buf.extend_from_slice(&0u32.to_le_bytes()); // version
        let mut machine_id = [0u8; 16];
        machine_id[..10].copy_from_slice(b"WORKSTATIO");
        buf.extend_from_slice(&machine_id);
        buf.extend_from_slice(&[0u8; 16 * 4]); // 4 GUIDs, zeroed
        assert_eq!(buf.len(), 0x60);
        buf.extend_from_slice(&0u32.to_le_bytes()); // terminator

        let extra = ExtraData::read(&buf, 0).unwrap();
        match &extra.blocks[0] {
            ExtraDataBlock::Tracker(t) => assert_eq!(t.machine_id, "WORKSTATIO"),
            other => panic!("expected Tracker, got {other:?}"),
        }
    }
}

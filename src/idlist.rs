use getset::CopyGetters;
#[allow(unused)]
use log::trace;

use crate::bytereader::read_u16_le;
use crate::Error;

/// The LinkTargetIDList structure (section 2.2). This core only counts and
/// sizes the ItemID sequence; individual ItemID payloads are not decoded or
/// retained.
#[derive(Clone, Copy, Debug, Default, CopyGetters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetIdList {
    /// Size in bytes of the IDList, including the leading size field and the
    /// terminating zero-length ItemID.
    #[getset(get_copy = "pub")]
    list_size: u16,

    /// Number of non-zero-length ItemID entries walked before the
    /// terminator.
    #[getset(get_copy = "pub")]
    num_items: u32,
}

impl TargetIdList {
    /// Reads the IDList starting at `off`, which must point at the u16
    /// `list_size` field. Returns the parsed list plus the number of bytes
    /// consumed.
    pub fn read(buf: &[u8], off: usize) -> Result<(Self, usize), Error> {
        let list_size = read_u16_le(buf, off)?;
        trace!("target id list size: {list_size}");

        let mut pos = off + 2;
        let mut num_items = 0u32;
        loop {
            let item_size = read_u16_le(buf, pos)?;
            if item_size == 0 {
                pos += 2;
                break;
            }
            pos += item_size as usize;
            num_items += 1;
        }

        let consumed = pos - off;
        Ok((
            Self {
                list_size: list_size + 2,
                num_items,
            },
            consumed,
        ))
    }

    /// The `flags & 0x1` clear case: no IDList present.
    pub fn absent() -> Self {
        Self {
            list_size: 0,
            num_items: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_counts_zero_items() {
        let mut buf = vec![0u8; 4];
        buf[0..2].copy_from_slice(&0u16.to_le_bytes());
        buf[2..4].copy_from_slice(&0u16.to_le_bytes());
        let (list, consumed) = TargetIdList::read(&buf, 0).unwrap();
        assert_eq!(list.list_size(), 2);
        assert_eq!(list.num_items(), 0);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn counts_each_item_before_terminator() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes()); // list_size placeholder
        buf.extend_from_slice(&4u16.to_le_bytes()); // item 1: size 4 (incl. prefix)
        buf.extend_from_slice(&[0xAA, 0xBB]);
        buf.extend_from_slice(&3u16.to_le_bytes()); // item 2: size 3
        buf.extend_from_slice(&[0xCC]);
        buf.extend_from_slice(&0u16.to_le_bytes()); // terminator
        let (list, _) = TargetIdList::read(&buf, 0).unwrap();
        assert_eq!(list.num_items(), 2);
    }

    #[test]
    fn absent_list_is_zeroed() {
        let list = TargetIdList::absent();
        assert_eq!(list.list_size(), 0);
        assert_eq!(list.num_items(), 0);
    }
}

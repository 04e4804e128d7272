#![allow(missing_docs)]
use bitflags::bitflags;
use getset::{CopyGetters, Getters};

use crate::bytereader::{read_i32_le, read_i64_le, read_u16_le, read_u32_le, read_u64_le};
use crate::guid::Guid;
use crate::Error;

/// A ShellLinkHeader structure (section 2.1), which contains identification
/// information, timestamps, and flags that specify the presence of optional
/// structures.
#[derive(Clone, Debug, Getters, CopyGetters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShellLinkHeader {
    #[getset(get_copy = "pub")]
    header_size: u32,

    #[getset(get_copy = "pub")]
    clsid: Guid,

    /// A LinkFlags structure (section 2.1.1) that specifies information about the shell link and
    /// the presence of optional portions of the structure.
    #[getset(get_copy = "pub")]
    link_flags: LinkFlags,

    /// A FileAttributesFlags structure (section 2.1.2) that specifies information about the link
    /// target.
    #[getset(get_copy = "pub")]
    file_attributes: FileAttributeFlags,

    /// A FILETIME structure ([MS-DTYP]section 2.3.3) that specifies the creation time of the link
    /// target in UTC (Coordinated Universal Time). If the value is zero, there is no creation time
    /// set on the link target.
    #[getset(get_copy = "pub")]
    creation_time: i64,

    /// A FILETIME structure ([MS-DTYP] section2.3.3) that specifies the access time of the link
    /// target in UTC (Coordinated Universal Time). If the value is zero, there is no access time
    /// set on the link target.
    #[getset(get_copy = "pub")]
    access_time: i64,

    /// A FILETIME structure ([MS-DTYP] section 2.3.3) that specifies the write time of the link
    /// target in UTC (Coordinated Universal Time). If the value is zero, there is no write time
    /// set on the link target.
    #[getset(get_copy = "pub")]
    write_time: i64,

    /// A 32-bit unsigned integer that specifies the size, in bytes, of the link target. If the
    /// link target file is larger than 0xFFFFFFFF, this value specifies the least significant 32
    /// bits of the link target file size.
    #[getset(get_copy = "pub")]
    target_size: u32,

    /// A 32-bit signed integer that specifies the index of an icon within a given icon location.
    #[getset(get_copy = "pub")]
    icon_index: i32,

    /// A 32-bit unsigned integer that specifies the expected window state of an application
    /// launched by the link. Kept as the raw wire value: the formatter, not the decoder, collapses
    /// unrecognized values to `SW_SHOWNORMAL`.
    #[getset(get_copy = "pub")]
    show_state: u32,

    /// The low byte of the Hotkey field: a virtual key code.
    #[getset(get_copy = "pub")]
    hotkey_low: u8,

    /// The high byte of the Hotkey field: a modifier bitfield.
    #[getset(get_copy = "pub")]
    hotkey_high: HotkeyModifiers,

    #[getset(get_copy = "pub")]
    reserved1: u16,
    #[getset(get_copy = "pub")]
    reserved2: u32,
    #[getset(get_copy = "pub")]
    reserved3: u32,
}

impl ShellLinkHeader {
    /// Reads exactly 76 bytes from offset 0. Does not re-run the validator;
    /// callers are expected to call [`crate::validator::validate`] first.
    pub fn read(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < 76 {
            return Err(Error::TruncatedHeader {
                pos: 0,
                needed: 76,
                available: buf.len(),
            });
        }

        let header_size = read_u32_le(buf, 0)?;
        let clsid_bytes: [u8; 16] = buf[4..20].try_into().unwrap();
        let clsid = Guid::from_bytes(&clsid_bytes);
        let link_flags = LinkFlags::from_bits_retain(read_u32_le(buf, 20)?);
        let file_attributes = FileAttributeFlags::from_bits_retain(read_u32_le(buf, 24)?);
        let creation_time = read_i64_le(buf, 28)?;
        let access_time = read_i64_le(buf, 36)?;
        let write_time = read_i64_le(buf, 44)?;
        let target_size = read_u32_le(buf, 52)?;
        let icon_index = read_i32_le(buf, 56)?;
        let show_state = read_u32_le(buf, 60)?;
        let hotkey_low = buf[64];
        let hotkey_high = HotkeyModifiers::from_bits_retain(buf[65]);
        let reserved1 = read_u16_le(buf, 66)?;
        let reserved2 = read_u32_le(buf, 68)?;
        let reserved3 = read_u32_le(buf, 72)?;

        Ok(Self {
            header_size,
            clsid,
            link_flags,
            file_attributes,
            creation_time,
            access_time,
            write_time,
            target_size,
            icon_index,
            show_state,
            hotkey_low,
            hotkey_high,
            reserved1,
            reserved2,
            reserved3,
        })
    }
}

bitflags! {
    /// The LinkFlags structure defines bits that specify which shell link structures are present in
    /// the file format after the ShellLinkHeader structure (section 2.1).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct LinkFlags: u32 {
        /// The shell link is saved with an item ID list (IDList). If this bit is set, a
        /// LinkTargetIDList structure (section 2.2) MUST follow the ShellLinkHeader.
        const HAS_LINK_TARGET_ID_LIST           = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        /// The shell link is saved with link information.
        const HAS_LINK_INFO                     = 0b0000_0000_0000_0000_0000_0000_0000_0010;
        /// The shell link is saved with a name string.
        const HAS_NAME                          = 0b0000_0000_0000_0000_0000_0000_0000_0100;
        /// The shell link is saved with a relative path string.
        const HAS_RELATIVE_PATH                 = 0b0000_0000_0000_0000_0000_0000_0000_1000;
        /// The shell link is saved with a working directory string.
        const HAS_WORKING_DIR                   = 0b0000_0000_0000_0000_0000_0000_0001_0000;
        /// The shell link is saved with command-line arguments.
        const HAS_ARGUMENTS                     = 0b0000_0000_0000_0000_0000_0000_0010_0000;
        /// The shell link is saved with an icon location string.
        const HAS_ICON_LOCATION                 = 0b0000_0000_0000_0000_0000_0000_0100_0000;
        /// The shell link contains Unicode encoded strings.
        const IS_UNICODE                        = 0b0000_0000_0000_0000_0000_0000_1000_0000;
        /// The LinkInfo structure (section 2.3) is ignored.
        const FORCE_NO_LINK_INFO                = 0b0000_0000_0000_0000_0000_0001_0000_0000;
        /// The shell link is saved with an EnvironmentVariableDataBlock (section 2.5.4).
        const HAS_EXP_STRING                    = 0b0000_0000_0000_0000_0000_0010_0000_0000;
        /// The target is run in a separate virtual machine for a 16-bit application.
        const RUN_IN_SEPARATE_PROCESS           = 0b0000_0000_0000_0000_0000_0100_0000_0000;
        /// A bit that is undefined and MUST be ignored.
        const UNUSED1                           = 0b0000_0000_0000_0000_0000_1000_0000_0000;
        /// The shell link is saved with a DarwinDataBlock (section 2.5.3).
        const HAS_DARWIN_ID                     = 0b0000_0000_0000_0000_0001_0000_0000_0000;
        /// The application is run as a different user when activated.
        const RUN_AS_USER                       = 0b0000_0000_0000_0000_0010_0000_0000_0000;
        /// The shell link is saved with an IconEnvironmentDataBlock (section 2.5.5).
        const HAS_EXP_ICON                      = 0b0000_0000_0000_0000_0100_0000_0000_0000;
        /// The file system location is represented in the shell namespace when parsed into an IDList.
        const NO_PIDL_ALIAS                     = 0b0000_0000_0000_0000_1000_0000_0000_0000;
        /// A bit that is undefined and MUST be ignored.
        const UNUSED2                           = 0b0000_0000_0000_0001_0000_0000_0000_0000;
        /// The shell link is saved with a ShimDataBlock (section 2.5.8).
        const RUN_WITH_SHIM_LAYER               = 0b0000_0000_0000_0010_0000_0000_0000_0000;
        /// The TrackerDataBlock (section 2.5.10) is ignored.
        const FORCE_NO_LINK_TRACK               = 0b0000_0000_0000_0100_0000_0000_0000_0000;
        /// Target properties are collected into a PropertyStoreDataBlock.
        const ENABLE_TARGET_METADATA            = 0b0000_0000_0000_1000_0000_0000_0000_0000;
        /// The EnvironmentVariableDataBlock is ignored.
        const DISABLE_LINK_PATH_TRACKING        = 0b0000_0000_0001_0000_0000_0000_0000_0000;
        /// The SpecialFolderDataBlock and KnownFolderDataBlock are ignored.
        const DISABLE_KNOWN_FOLDER_TRACKING     = 0b0000_0000_0010_0000_0000_0000_0000_0000;
        /// The unaliased form of the known folder IDList SHOULD be used.
        const DISABLE_KNOWN_FOLDER_ALIAS        = 0b0000_0000_0100_0000_0000_0000_0000_0000;
        /// Creating a link that references another link is enabled.
        const ALLOW_LINK_TO_LINK                = 0b0000_0000_1000_0000_0000_0000_0000_0000;
        /// The unaliased form of a known folder should be used when saving.
        const UNALIAS_ON_SAVE                   = 0b0000_0001_0000_0000_0000_0000_0000_0000;
        /// The target IDList SHOULD NOT be stored.
        const PREFER_ENVIRONMENT_PATH           = 0b0000_0010_0000_0000_0000_0000_0000_0000;
        /// A local path IDList SHOULD be stored for a UNC target.
        const KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET = 0b0000_0100_0000_0000_0000_0000_0000_0000;
    }
}

bitflags! {
    /// The FileAttributesFlags structure defines bits that specify the file attributes of the link
    /// target, if the target is a file system item.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct FileAttributeFlags: u32 {
        const FILE_ATTRIBUTE_READONLY               = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        const FILE_ATTRIBUTE_HIDDEN                 = 0b0000_0000_0000_0000_0000_0000_0000_0010;
        const FILE_ATTRIBUTE_SYSTEM                 = 0b0000_0000_0000_0000_0000_0000_0000_0100;
        const RESERVED1                             = 0b0000_0000_0000_0000_0000_0000_0000_1000;
        const FILE_ATTRIBUTE_DIRECTORY              = 0b0000_0000_0000_0000_0000_0000_0001_0000;
        const FILE_ATTRIBUTE_ARCHIVE                = 0b0000_0000_0000_0000_0000_0000_0010_0000;
        const RESERVED2                             = 0b0000_0000_0000_0000_0000_0000_0100_0000;
        const FILE_ATTRIBUTE_NORMAL                 = 0b0000_0000_0000_0000_0000_0000_1000_0000;
        const FILE_ATTRIBUTE_TEMPORARY              = 0b0000_0000_0000_0000_0000_0001_0000_0000;
        const FILE_ATTRIBUTE_SPARSE_FILE            = 0b0000_0000_0000_0000_0000_0010_0000_0000;
        const FILE_ATTRIBUTE_REPARSE_POINT          = 0b0000_0000_0000_0000_0000_0100_0000_0000;
        const FILE_ATTRIBUTE_COMPRESSED             = 0b0000_0000_0000_0000_0000_1000_0000_0000;
        const FILE_ATTRIBUTE_OFFLINE                = 0b0000_0000_0000_0000_0001_0000_0000_0000;
        const FILE_ATTRIBUTE_NOT_CONTENT_INDEXED    = 0b0000_0000_0000_0000_0010_0000_0000_0000;
        const FILE_ATTRIBUTE_ENCRYPTED              = 0b0000_0000_0000_0000_0100_0000_0000_0000;
    }
}

bitflags! {
    /// An 8-bit unsigned integer that specifies bits that correspond to modifier keys on the
    /// keyboard.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct HotkeyModifiers: u8 {
        /// No modifier key is being used.
        const NO_MODIFIER       = 0x00;
        /// The "SHIFT" key on the keyboard.
        const HOTKEYF_SHIFT     = 0x01;
        /// The "CTRL" key on the keyboard.
        const HOTKEYF_CONTROL   = 0x02;
        /// The "ALT" key on the keyboard.
        const HOTKEYF_ALT       = 0x04;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; 76];
        buf[0..4].copy_from_slice(&0x4Cu32.to_le_bytes());
        buf[20..24].copy_from_slice(&0u32.to_le_bytes());
        buf[60..64].copy_from_slice(&0x03u32.to_le_bytes());
        buf
    }

    #[test]
    fn reads_fixed_offsets() {
        let header = ShellLinkHeader::read(&sample_header_bytes()).unwrap();
        assert_eq!(header.header_size(), 0x4C);
        assert_eq!(header.show_state(), 0x03);
        assert_eq!(header.link_flags(), LinkFlags::empty());
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(ShellLinkHeader::read(&[0u8; 10]).is_err());
    }
}

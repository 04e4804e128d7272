use bitflags::bitflags;
#[allow(unused)]
use log::warn;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::bytereader::{read_ansi_cstr, read_u32_le, read_utf16le_cstr};
use crate::Error;

/// The LinkInfo structure specifies information necessary to resolve a link
/// target if it is not found in its original location.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkInfo {
    pub size: u32,
    pub header_size: u32,
    pub flags: LinkInfoFlags,
    pub volume_id_offset: u32,
    pub local_base_path_offset: u32,
    pub cnrl_offset: u32,
    pub common_path_suffix_offset: u32,
    pub local_base_path_offset_u: u32,
    pub common_path_suffix_offset_u: u32,
    pub volume_id: Option<VolumeId>,
    pub local_base_path: Option<String>,
    pub local_base_path_u: Option<String>,
    pub cnrl: Option<CommonNetworkRelativeLink>,
    pub common_path_suffix: Option<String>,
    pub common_path_suffix_u: Option<String>,
}

const MAX_PATH_CHARS: usize = 4096;

impl LinkInfo {
    /// `flags & 0x2` clear: no LinkInfo present.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Reads the LinkInfo block starting at `start` (the absolute position
    /// of its own `size` field). All offsets declared inside the block are
    /// relative to `start`; this decoder canonicalizes every one of them to
    /// an absolute file offset at the point it reads it rather than mixing
    /// "relative to LinkInfo" and "relative to CNRL" bases, per the
    /// buffer-relative-offset note recorded for this module.
    ///
    /// Returns the decoded block and the number of bytes it occupies
    /// (`size`). A malformed offset or string inside the block degrades the
    /// affected field to `None` and logs a warning; only a truncated `size`
    /// field itself is a hard error.
    pub fn read(buf: &[u8], start: usize) -> Result<(Self, usize), Error> {
        let size = read_u32_le(buf, start)?;
        let header_size = read_u32_le(buf, start + 4).unwrap_or(0x1C);
        let flags = LinkInfoFlags::from_bits_retain(read_u32_le(buf, start + 8).unwrap_or(0));
        let volume_id_offset = read_u32_le(buf, start + 12).unwrap_or(0);
        let local_base_path_offset = read_u32_le(buf, start + 16).unwrap_or(0);
        let cnrl_offset = read_u32_le(buf, start + 20).unwrap_or(0);
        let common_path_suffix_offset = read_u32_le(buf, start + 24).unwrap_or(0);

        let (local_base_path_offset_u, common_path_suffix_offset_u) = if header_size >= 0x24 {
            (
                read_u32_le(buf, start + 28).unwrap_or(0),
                read_u32_le(buf, start + 32).unwrap_or(0),
            )
        } else {
            (0, 0)
        };

        let mut volume_id = None;
        let mut local_base_path = None;
        let mut local_base_path_u = None;
        if flags.contains(LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH) {
            match VolumeId::read(buf, start + volume_id_offset as usize, header_size) {
                Ok(v) => volume_id = Some(v),
                Err(e) => warn!("LinkInfo VolumeID malformed, omitting: {e}"),
            }
            local_base_path =
                Some(read_ansi_cstr(buf, start + local_base_path_offset as usize, MAX_PATH_CHARS));
            if header_size >= 0x24 && local_base_path_offset_u > 0 {
                let (s, count) =
                    read_utf16le_cstr(buf, start + local_base_path_offset_u as usize, MAX_PATH_CHARS);
                if count >= 0 {
                    local_base_path_u = Some(s);
                }
            }
        }

        let mut cnrl = None;
        if flags.contains(LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX) {
            match CommonNetworkRelativeLink::read(buf, start + cnrl_offset as usize) {
                Ok(c) => cnrl = Some(c),
                Err(e) => warn!("LinkInfo CommonNetworkRelativeLink malformed, omitting: {e}"),
            }
        }

        let common_path_suffix = if common_path_suffix_offset > 0 {
            Some(read_ansi_cstr(
                buf,
                start + common_path_suffix_offset as usize,
                MAX_PATH_CHARS,
            ))
        } else {
            None
        };
        let common_path_suffix_u = if common_path_suffix_offset_u > 0 {
            let (s, count) = read_utf16le_cstr(
                buf,
                start + common_path_suffix_offset_u as usize,
                MAX_PATH_CHARS,
            );
            (count >= 0).then_some(s)
        } else {
            None
        };

        Ok((
            Self {
                size,
                header_size,
                flags,
                volume_id_offset,
                local_base_path_offset,
                cnrl_offset,
                common_path_suffix_offset,
                local_base_path_offset_u,
                common_path_suffix_offset_u,
                volume_id,
                local_base_path,
                local_base_path_u,
                cnrl,
                common_path_suffix,
                common_path_suffix_u,
            },
            size as usize,
        ))
    }
}

bitflags! {
    /// Flags that specify whether the VolumeID, LocalBasePath,
    /// LocalBasePathUnicode, and CommonNetworkRelativeLink fields are present.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct LinkInfoFlags: u32 {
        const VOLUME_ID_AND_LOCAL_BASE_PATH = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX = 0b0000_0000_0000_0000_0000_0000_0000_0010;
    }
}

/// The VolumeID structure specifies information about the volume that a link
/// target was on when the link was created.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VolumeId {
    pub size: u32,
    pub drive_type: u32,
    pub drive_serial_number: u32,
    pub label_offset: u32,
    pub label_offset_u: Option<u32>,
    /// ANSI volume label. `None` when the header declares a Unicode label
    /// instead (`label_offset == 0x14`); the formatter renders that case as
    /// the literal `[NOT USED]`.
    pub volume_label: Option<String>,
    pub volume_label_u: Option<String>,
}

impl VolumeId {
    fn read(buf: &[u8], start: usize, link_info_header_size: u32) -> Result<Self, Error> {
        let size = read_u32_le(buf, start)?;
        let drive_type = read_u32_le(buf, start + 4)?;
        let drive_serial_number = read_u32_le(buf, start + 8)?;
        let label_offset = read_u32_le(buf, start + 12)?;

        if link_info_header_size < 0x24 {
            let label = read_ansi_cstr(buf, start + label_offset as usize, 260);
            Ok(Self {
                size,
                drive_type,
                drive_serial_number,
                label_offset,
                label_offset_u: None,
                volume_label: Some(label),
                volume_label_u: None,
            })
        } else {
            let label_offset_u = read_u32_le(buf, start + 16)?;
            let (label_u, count) = read_utf16le_cstr(buf, start + label_offset_u as usize, 260);
            Ok(Self {
                size,
                drive_type,
                drive_serial_number,
                label_offset,
                label_offset_u: Some(label_offset_u),
                volume_label: None,
                volume_label_u: (count >= 0).then_some(label_u),
            })
        }
    }
}

/// A 32-bit, unsigned integer that specifies the type of drive the link
/// target is stored on.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DriveType {
    DriveUnknown = 0x00,
    DriveNoRootDir = 0x01,
    DriveRemovable = 0x02,
    DriveFixed = 0x03,
    DriveRemote = 0x04,
    DriveCDRom = 0x05,
    DriveRamdisk = 0x06,
}

impl DriveType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        FromPrimitive::from_u32(raw)
    }
}

/// The CommonNetworkRelativeLink structure specifies information about the
/// network location where a link target is stored.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommonNetworkRelativeLink {
    pub size: u32,
    pub flags: CommonNetworkRelativeLinkFlags,
    pub net_name_offset: u32,
    pub device_name_offset: u32,
    /// Raw network provider code; only meaningful when
    /// `flags.contains(VALID_NET_TYPE)`.
    pub network_provider_type: u32,
    pub net_name_offset_u: Option<u32>,
    pub device_name_offset_u: Option<u32>,
    pub net_name: Option<String>,
    pub device_name: Option<String>,
    pub net_name_u: Option<String>,
    pub device_name_u: Option<String>,
}

impl CommonNetworkRelativeLink {
    fn read(buf: &[u8], start: usize) -> Result<Self, Error> {
        let size = read_u32_le(buf, start)?;
        let flags = CommonNetworkRelativeLinkFlags::from_bits_retain(read_u32_le(buf, start + 4)?);
        let net_name_offset = read_u32_le(buf, start + 8)?;
        let device_name_offset = read_u32_le(buf, start + 12)?;
        let network_provider_type = read_u32_le(buf, start + 16)?;

        let unicode_present = net_name_offset > 0x14;
        let (net_name_offset_u, device_name_offset_u) = if unicode_present {
            (
                read_u32_le(buf, start + 20).ok(),
                read_u32_le(buf, start + 24).ok(),
            )
        } else {
            (None, None)
        };

        let net_name = Some(read_ansi_cstr(buf, start + net_name_offset as usize, MAX_PATH_CHARS));
        let device_name = if flags.contains(CommonNetworkRelativeLinkFlags::VALID_DEVICE) {
            Some(read_ansi_cstr(
                buf,
                start + device_name_offset as usize,
                MAX_PATH_CHARS,
            ))
        } else {
            None
        };

        let net_name_u = net_name_offset_u.and_then(|off| {
            let (s, count) = read_utf16le_cstr(buf, start + off as usize, MAX_PATH_CHARS);
            (count >= 0).then_some(s)
        });
        let device_name_u = device_name_offset_u.and_then(|off| {
            let (s, count) = read_utf16le_cstr(buf, start + off as usize, MAX_PATH_CHARS);
            (count >= 0).then_some(s)
        });

        Ok(Self {
            size,
            flags,
            net_name_offset,
            device_name_offset,
            network_provider_type,
            net_name_offset_u,
            device_name_offset_u,
            net_name,
            device_name,
            net_name_u,
            device_name_u,
        })
    }
}

bitflags! {
    /// Flags that specify the contents of the DeviceNameOffset and
    /// NetProviderType fields.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct CommonNetworkRelativeLinkFlags: u32 {
        const VALID_DEVICE = 0b0000_0000_0000_0000_0000_0000_0000_0001;
        const VALID_NET_TYPE = 0b0000_0000_0000_0000_0000_0000_0000_0010;
    }
}

/// A 32-bit, unsigned integer that specifies the type of network provider.
/// <https://learn.microsoft.com/de-de/windows/win32/api/winbase/ns-winbase-file_remote_protocol_info>
///
/// The reference `lifer` decoder's provider-name switch only recognizes
/// codes from `WNNC_NET_AVID` (0x001A0000) upward; lower, more common codes
/// like `WNNC_NET_LANMAN`/SMB (0x00020000) fall through to its `default`
/// case and render as the generic "possibly local server" fallback (see
/// [`crate::formatter::format_network_provider`]). This enum reproduces
/// that recognized subset rather than the full MS-SHLLINK WNNC table, so
/// that network-shortcut rendering stays bit-stable with the reference.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NetworkProviderType {
    Avid = 0x1a0000,
    Docuspace = 0x1b0000,
    Mangosoft = 0x1c0000,
    Sernet = 0x1d0000,
    Riverfront1 = 0x1e0000,
    Riverfront2 = 0x1f0000,
    Decorb = 0x200000,
    Protstor = 0x210000,
    FjRedir = 0x220000,
    Distinct = 0x230000,
    Twins = 0x240000,
    Rdr2Sample = 0x250000,
    CSC = 0x260000,
    _3In1 = 0x270000,
    ExtendNet = 0x290000,
    Stac = 0x2a0000,
    Foxbat = 0x2b0000,
    Yahoo = 0x2c0000,
    Exifs = 0x2d0000,
    Dav = 0x2e0000,
    Knoware = 0x2f0000,
    ObjectDire = 0x300000,
    Masfax = 0x310000,
    HobNfs = 0x320000,
    Shiva = 0x330000,
    Ibmal = 0x340000,
    Lock = 0x350000,
    Termsrv = 0x360000,
    Srt = 0x370000,
    Quincy = 0x380000,
    Openafs = 0x390000,
    Avid1 = 0x3a0000,
    Dfs = 0x3b0000,
    Kwnp = 0x3c0000,
    Zenworks = 0x3d0000,
    Driveonweb = 0x3e0000,
    Vmware = 0x3f0000,
    Rsfx = 0x400000,
    Mfiles = 0x410000,
    MsNfs = 0x420000,
    Google = 0x430000,
}

impl NetworkProviderType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        FromPrimitive::from_u32(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn local_volume_link_info_decodes() {
        // Layout: header(24) + volume_id(17+"TEST\0") + local_base_path + common_path_suffix
        let mut buf = Vec::new();
        let header_size = 0x1Cu32;
        // placeholders, patched after we know offsets
        let volume_id_off = 0x1Cu32; // right after fixed 28-byte prefix w/o unicode fields -> header_size 0x1C means prefix is 0x1C bytes? use 0x18 fixed part then flags...
        write_u32(&mut buf, 0); // size placeholder
        write_u32(&mut buf, header_size);
        write_u32(&mut buf, 0x1); // flags: volume id + local base path
        write_u32(&mut buf, volume_id_off);
        let lbp_off_pos = buf.len();
        write_u32(&mut buf, 0); // local_base_path_offset placeholder
        write_u32(&mut buf, 0); // cnrl_offset
        write_u32(&mut buf, 0); // common_path_suffix_offset (unused here)

        // VolumeID at volume_id_off
        assert_eq!(buf.len() as u32, volume_id_off);
        write_u32(&mut buf, 0x11); // volume_id_size
        write_u32(&mut buf, 0x3); // drive_type fixed
        write_u32(&mut buf, 0xDEADBEEF);
        write_u32(&mut buf, 0x10); // label_offset (right after this 16-byte prefix)
        buf.extend_from_slice(b"TEST\0");

        let lbp_off = buf.len() as u32;
        buf[lbp_off_pos..lbp_off_pos + 4].copy_from_slice(&lbp_off.to_le_bytes());
        buf.extend_from_slice(b"C:\\file.txt\0");

        let total_size = buf.len() as u32;
        buf[0..4].copy_from_slice(&total_size.to_le_bytes());

        let (info, consumed) = LinkInfo::read(&buf, 0).unwrap();
        assert_eq!(consumed, total_size as usize);
        let vol = info.volume_id.unwrap();
        assert_eq!(vol.drive_type, 0x3);
        assert_eq!(vol.drive_serial_number, 0xDEADBEEF);
        assert_eq!(vol.volume_label.as_deref(), Some("TEST"));
        assert_eq!(info.local_base_path.as_deref(), Some("C:\\file.txt"));
    }

    #[test]
    fn network_link_info_decodes() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0); // size placeholder
        write_u32(&mut buf, 0x1C); // header_size
        write_u32(&mut buf, 0x2); // flags: CNRL only
        write_u32(&mut buf, 0); // volume_id_offset
        write_u32(&mut buf, 0); // local_base_path_offset
        let cnrl_off_pos = buf.len();
        write_u32(&mut buf, 0); // cnrl_offset placeholder
        write_u32(&mut buf, 0); // common_path_suffix_offset

        let cnrl_off = buf.len() as u32;
        let net_name_offset = 0x14u32;
        let net_name = b"\\\\server\\share\0";
        let device_name_offset = net_name_offset + net_name.len() as u32;
        buf[cnrl_off_pos..cnrl_off_pos + 4].copy_from_slice(&cnrl_off.to_le_bytes());
        write_u32(&mut buf, 0x14); // cnrl size placeholder, patched below
        write_u32(&mut buf, 0x3); // flags: valid device + valid net type
        write_u32(&mut buf, net_name_offset);
        write_u32(&mut buf, device_name_offset);
        write_u32(&mut buf, 0x00020000); // network_provider_type
        buf.extend_from_slice(net_name); // at net_name_offset
        buf.extend_from_slice(b"Z:\0");

        let cnrl_size = (buf.len() as u32) - cnrl_off;
        let cnrl_size_pos = cnrl_off as usize;
        buf[cnrl_size_pos..cnrl_size_pos + 4].copy_from_slice(&cnrl_size.to_le_bytes());

        let total_size = buf.len() as u32;
        buf[0..4].copy_from_slice(&total_size.to_le_bytes());

        let (info, _) = LinkInfo::read(&buf, 0).unwrap();
        let cnrl = info.cnrl.unwrap();
        assert_eq!(cnrl.network_provider_type, 0x00020000);
        assert_eq!(cnrl.net_name.as_deref(), Some("\\\\server\\share"));
        assert_eq!(cnrl.device_name.as_deref(), Some("Z:"));
    }
}

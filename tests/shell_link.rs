#[allow(unused)]
use log::{debug, error, info, trace, warn};
use lnkcore::*;

use lnkcore::formatter::{describe_guid, format_cnrl_flags, format_drive_serial, format_drive_type, format_network_provider};

const CLSID_DATA1: u32 = 0x0002_1401;

/// A 76-byte header with a valid CLSID and reserved fields, everything else
/// zeroed except `flags`.
fn valid_header(flags: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 76];
    buf[0..4].copy_from_slice(&0x4Cu32.to_le_bytes());
    buf[4..8].copy_from_slice(&CLSID_DATA1.to_le_bytes());
    buf[12..14].copy_from_slice(&[0xC0, 0x00]);
    buf[14..20].copy_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x46]);
    buf[20..24].copy_from_slice(&flags.to_le_bytes());
    buf
}

#[test]
fn minimum_header_only() {
    let _ = pretty_env_logger::try_init();

    let buf = valid_header(0);
    let shortcut = ShellLink::from_bytes(&buf).unwrap();

    assert!(shortcut.target_id_list().is_none());
    assert!(shortcut.link_info().is_none());
    assert_eq!(shortcut.string_data().size, 0);
    assert_eq!(shortcut.extra_data().size, 0);
    assert_eq!(formatter::format_show_state(shortcut.header().show_state()), "SW_SHOWNORMAL");
    let (creation_short, _) = formatter::format_filetime(shortcut.header().creation_time());
    assert_eq!(creation_short, "1601-01-01 00:00:00 (UTC)");
}

#[test]
fn target_id_list_flag_with_empty_list() {
    let _ = pretty_env_logger::try_init();

    let mut buf = valid_header(LinkFlags::HAS_LINK_TARGET_ID_LIST.bits());
    buf.extend_from_slice(&0u16.to_le_bytes()); // list_size placeholder
    buf.extend_from_slice(&0u16.to_le_bytes()); // terminator

    let shortcut = ShellLink::from_bytes(&buf).unwrap();
    let list = shortcut.target_id_list().unwrap();
    assert_eq!(list.list_size(), 2);
    assert_eq!(list.num_items(), 0);
}

#[test]
fn local_only_shortcut() {
    let _ = pretty_env_logger::try_init();

    let flags =
        LinkFlags::HAS_LINK_TARGET_ID_LIST | LinkFlags::HAS_LINK_INFO | LinkFlags::IS_UNICODE;
    let mut buf = valid_header(flags.bits());

    // Minimal TargetIDList: empty.
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());

    // LinkInfo: VolumeID + LocalBasePath, header_size 0x1C (ANSI volume label).
    let mut info = Vec::new();
    info.extend_from_slice(&0u32.to_le_bytes()); // size placeholder
    info.extend_from_slice(&0x1Cu32.to_le_bytes()); // header_size
    info.extend_from_slice(&0x1u32.to_le_bytes()); // flags: volume id + local base path
    let volume_id_off = 0x1Cu32;
    info.extend_from_slice(&volume_id_off.to_le_bytes());
    let lbp_off_pos = info.len();
    info.extend_from_slice(&0u32.to_le_bytes()); // local_base_path_offset placeholder
    info.extend_from_slice(&0u32.to_le_bytes()); // cnrl_offset
    info.extend_from_slice(&0u32.to_le_bytes()); // common_path_suffix_offset

    assert_eq!(info.len() as u32, volume_id_off);
    info.extend_from_slice(&0x11u32.to_le_bytes()); // volume_id size
    info.extend_from_slice(&0x3u32.to_le_bytes()); // drive_type: FIXED
    info.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    info.extend_from_slice(&0x10u32.to_le_bytes()); // label_offset
    info.extend_from_slice(b"TEST\0");

    let lbp_off = info.len() as u32;
    info[lbp_off_pos..lbp_off_pos + 4].copy_from_slice(&lbp_off.to_le_bytes());
    info.extend_from_slice(b"C:\\file.txt\0");

    let total_size = info.len() as u32;
    info[0..4].copy_from_slice(&total_size.to_le_bytes());
    buf.extend_from_slice(&info);

    let shortcut = ShellLink::from_bytes(&buf).unwrap();
    assert!(shortcut.target_id_list().is_some());
    let link_info = shortcut.link_info().unwrap();
    let vol = link_info.volume_id.as_ref().unwrap();
    assert_eq!(format_drive_type(vol.drive_type), "DRIVE_FIXED");
    assert_eq!(format_drive_serial(vol.drive_serial_number), "DEADBEEF");
    assert_eq!(vol.volume_label.as_deref(), Some("TEST"));
    assert_eq!(link_info.local_base_path.as_deref(), Some("C:\\file.txt"));
}

#[test]
fn network_shortcut() {
    let _ = pretty_env_logger::try_init();

    let flags = LinkFlags::HAS_LINK_INFO;
    let mut buf = valid_header(flags.bits());

    let mut info = Vec::new();
    info.extend_from_slice(&0u32.to_le_bytes()); // size placeholder
    info.extend_from_slice(&0x1Cu32.to_le_bytes()); // header_size
    info.extend_from_slice(&0x2u32.to_le_bytes()); // flags: CNRL only
    info.extend_from_slice(&0u32.to_le_bytes()); // volume_id_offset
    info.extend_from_slice(&0u32.to_le_bytes()); // local_base_path_offset
    let cnrl_off_pos = info.len();
    info.extend_from_slice(&0u32.to_le_bytes()); // cnrl_offset placeholder
    info.extend_from_slice(&0u32.to_le_bytes()); // common_path_suffix_offset

    let cnrl_off = info.len() as u32;
    let net_name_offset = 0x14u32;
    let net_name = b"\\\\server\\share\0";
    let device_name_offset = net_name_offset + net_name.len() as u32;
    info[cnrl_off_pos..cnrl_off_pos + 4].copy_from_slice(&cnrl_off.to_le_bytes());
    let cnrl_size_pos = info.len();
    info.extend_from_slice(&0u32.to_le_bytes()); // cnrl size placeholder
    info.extend_from_slice(&0x3u32.to_le_bytes()); // flags: ValidDevice | ValidNetType
    info.extend_from_slice(&net_name_offset.to_le_bytes());
    info.extend_from_slice(&device_name_offset.to_le_bytes());
    info.extend_from_slice(&0x0002_0000u32.to_le_bytes()); // network_provider_type
    info.extend_from_slice(net_name);
    info.extend_from_slice(b"Z:\0");

    let cnrl_size = (info.len() as u32) - cnrl_off;
    info[cnrl_size_pos..cnrl_size_pos + 4].copy_from_slice(&cnrl_size.to_le_bytes());

    let total_size = info.len() as u32;
    info[0..4].copy_from_slice(&total_size.to_le_bytes());
    buf.extend_from_slice(&info);

    let shortcut = ShellLink::from_bytes(&buf).unwrap();
    let link_info = shortcut.link_info().unwrap();
    let cnrl = link_info.cnrl.as_ref().unwrap();
    assert_eq!(format_cnrl_flags(cnrl.flags), "ValidDevice | ValidNetType");
    assert_eq!(format_network_provider(cnrl.network_provider_type), "[UNKNOWN (Possibly Local Server)]");
    assert_eq!(cnrl.net_name.as_deref(), Some("\\\\server\\share"));
    assert_eq!(cnrl.device_name.as_deref(), Some("Z:"));
}

#[test]
fn shortcut_with_tracker_data() {
    let _ = pretty_env_logger::try_init();

    let mut buf = valid_header(0);

    // A version-1 droid1 GUID whose timestamp rebases to the FILETIME epoch.
    let epoch_adjustment: u64 = 10_000_000u64 * 86_400 * 5113;
    let data1 = (epoch_adjustment & 0xFFFF_FFFF) as u32;
    let data2 = ((epoch_adjustment >> 32) & 0xFFFF) as u16;
    let data3 = (((epoch_adjustment >> 48) & 0x0FFF) as u16) | 0x1000;
    let mut droid1 = Vec::new();
    droid1.extend_from_slice(&data1.to_le_bytes());
    droid1.extend_from_slice(&data2.to_le_bytes());
    droid1.extend_from_slice(&data3.to_le_bytes());
    droid1.extend_from_slice(&[0xC0, 0x00, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    let mut machine_id = [0u8; 16];
    machine_id[..14].copy_from_slice(b"workstation-01");

    let mut block = Vec::new();
    block.extend_from_slice(&0x60u32.to_le_bytes()); // block size
    block.extend_from_slice(&0xA000_0003u32.to_le_bytes()); // TRACKER_PROPS signature
    block.extend_from_slice(&0x58u32.to_le_bytes()); // length
    block.extend_from_slice(&0u32.to_le_bytes()); // version
    block.extend_from_slice(&machine_id);
    block.extend_from_slice(&droid1);
    block.extend_from_slice(&[0u8; 16]); // droid2
    block.extend_from_slice(&[0u8; 16]); // droid_birth1
    block.extend_from_slice(&[0u8; 16]); // droid_birth2
    assert_eq!(block.len(), 0x60);

    buf.extend_from_slice(&block);
    buf.extend_from_slice(&0u32.to_le_bytes()); // ExtraData terminator

    let shortcut = ShellLink::from_bytes(&buf).unwrap();
    assert!(shortcut
        .extra_data()
        .types_present()
        .contains(&extradata::ExtraDataKind::Tracker));

    let tracker_block = shortcut
        .extra_data()
        .blocks
        .iter()
        .find_map(|b| match b {
            extradata::ExtraDataBlock::Tracker(t) => Some(t),
            _ => None,
        })
        .unwrap();
    assert_eq!(tracker_block.machine_id, "workstation-01");

    let display = describe_guid(&tracker_block.droid1);
    let (short_time, _) = display.time.unwrap();
    assert_eq!(short_time, "1601-01-01 00:00:00 (UTC)");
    assert_eq!(display.node.as_deref(), Some("00:11:22:33:44:55"));
}

#[test]
fn invalid_clsid_is_rejected() {
    let _ = pretty_env_logger::try_init();

    let mut buf = valid_header(0);
    buf[4..8].copy_from_slice(&0x0002_1400u32.to_le_bytes());

    match ShellLink::from_bytes(&buf) {
        Err(Error::NotAShellLink(validator::ValidationError::BadClsidData1)) => {}
        other => panic!("expected BadClsidData1, got {other:?}"),
    }
}

//! Pure rendering of a decoded [`crate::ShellLink`] into display strings.
//!
//! Nothing in this module touches the filesystem or performs any decoding;
//! it is a one-way function from the structured record to the field strings
//! the reference `lifer` tool's `text_out`/`sv_out` would have printed. The
//! caller decides how those strings get laid out (table, section-bannered
//! text, CSV row) — that concern lives in the `lnkdump` binary, not here.

use crate::filetime::filetime_to_iso;
use crate::guid::Guid;
use crate::header::{FileAttributeFlags, LinkFlags};

/// Sentinel rendered for a field whose containing structure is absent.
pub const NOT_SET: &str = "[NOT SET]";
/// Sentinel rendered for a field superseded by its Unicode counterpart.
pub const NOT_USED: &str = "[NOT USED]";
/// Sentinel rendered for a field that does not apply in the current mode.
pub const NOT_APPLICABLE: &str = "[N/A]";
/// Sentinel rendered for a present-but-zero-length string.
pub const EMPTY: &str = "[EMPTY]";

/// Renders an optional string field with the `[EMPTY]` / `[NOT SET]` /
/// `[NOT USED]` sentinel rules the reference tool uses throughout.
pub fn render_optional_string(value: &Option<String>, absent_sentinel: &str) -> String {
    match value {
        None => absent_sentinel.to_string(),
        Some(s) if s.is_empty() => EMPTY.to_string(),
        Some(s) => s.clone(),
    }
}

const LINK_FLAG_TOKENS: [(LinkFlags, &str); 27] = [
    (LinkFlags::HAS_LINK_TARGET_ID_LIST, "TARGET_ID_LIST"),
    (LinkFlags::HAS_LINK_INFO, "LINK_INFO"),
    (LinkFlags::HAS_NAME, "NAME"),
    (LinkFlags::HAS_RELATIVE_PATH, "RELATIVE_PATH"),
    (LinkFlags::HAS_WORKING_DIR, "WORKING_DIR"),
    (LinkFlags::HAS_ARGUMENTS, "ARGUMENTS"),
    (LinkFlags::HAS_ICON_LOCATION, "ICON_LOCATION"),
    (LinkFlags::IS_UNICODE, "UNICODE"),
    (LinkFlags::FORCE_NO_LINK_INFO, "FORCE_NO_LINK_INFO"),
    (LinkFlags::HAS_EXP_STRING, "EXP_STRING"),
    (LinkFlags::RUN_IN_SEPARATE_PROCESS, "RUN_SEP_PROCESS"),
    (LinkFlags::UNUSED1, "UNUSED_FLAG1"),
    (LinkFlags::HAS_DARWIN_ID, "DARWIN_ID"),
    (LinkFlags::RUN_AS_USER, "RUN_AS_USER"),
    (LinkFlags::HAS_EXP_ICON, "EXP_ICON"),
    (LinkFlags::NO_PIDL_ALIAS, "NO_PIDL_ALIAS"),
    (LinkFlags::UNUSED2, "UNUSED_FLAG_2"),
    (LinkFlags::RUN_WITH_SHIM_LAYER, "SHIM_LAYER"),
    (LinkFlags::FORCE_NO_LINK_TRACK, "FORCE_NO_LINK_TRACKER"),
    (LinkFlags::ENABLE_TARGET_METADATA, "TARGET_METADATA"),
    (LinkFlags::DISABLE_LINK_PATH_TRACKING, "DISABLE_LINK_PATH_TRACKING"),
    (LinkFlags::DISABLE_KNOWN_FOLDER_TRACKING, "DISABLE_KNOWN_FOLDER_TRACKING"),
    (LinkFlags::DISABLE_KNOWN_FOLDER_ALIAS, "DISABLE_KNOWN_FOLDER_ALIAS"),
    (LinkFlags::ALLOW_LINK_TO_LINK, "LINK_TO_LINK"),
    (LinkFlags::UNALIAS_ON_SAVE, "UNALIAS_ON_SAVE"),
    (LinkFlags::PREFER_ENVIRONMENT_PATH, "PREFER_ENVIRONMENT_PATH"),
    (LinkFlags::KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET, "KEEP_LOCAL_ID_LIST"),
];

/// Renders the header `LinkFlags` bitfield as a ` | `-joined token list in
/// bit0-first order, per §4.8. An empty flag set renders as an empty string.
pub fn format_link_flags(flags: LinkFlags) -> String {
    LINK_FLAG_TOKENS
        .iter()
        .filter(|(bit, _)| flags.contains(*bit))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" | ")
}

const ATTRIBUTE_TOKENS: [(FileAttributeFlags, &str); 13] = [
    (FileAttributeFlags::FILE_ATTRIBUTE_READONLY, "READONLY"),
    (FileAttributeFlags::FILE_ATTRIBUTE_HIDDEN, "HIDDEN"),
    (FileAttributeFlags::FILE_ATTRIBUTE_SYSTEM, "SYSTEM"),
    (FileAttributeFlags::FILE_ATTRIBUTE_DIRECTORY, "DIR"),
    (FileAttributeFlags::FILE_ATTRIBUTE_ARCHIVE, "ARCHIVE"),
    (FileAttributeFlags::FILE_ATTRIBUTE_NORMAL, "NORMAL"),
    (FileAttributeFlags::FILE_ATTRIBUTE_TEMPORARY, "TEMP"),
    (FileAttributeFlags::FILE_ATTRIBUTE_SPARSE_FILE, "SPARSE"),
    (FileAttributeFlags::FILE_ATTRIBUTE_REPARSE_POINT, "REPARSE"),
    (FileAttributeFlags::FILE_ATTRIBUTE_COMPRESSED, "COMPRESSED"),
    (FileAttributeFlags::FILE_ATTRIBUTE_OFFLINE, "OFFLINE"),
    (FileAttributeFlags::FILE_ATTRIBUTE_NOT_CONTENT_INDEXED, "NOT_INDEXED"),
    (FileAttributeFlags::FILE_ATTRIBUTE_ENCRYPTED, "ENCRYPTED"),
];

/// Renders the header `FileAttributeFlags` bitfield. `0` renders as `NONE`;
/// `0x80` alone (FILE_ATTRIBUTE_NORMAL, which MS-SHLLINK defines as
/// meaningful only in isolation) renders as `NORMAL` by itself even though
/// the general rule below would already produce that for a lone bit.
pub fn format_attributes(attrs: FileAttributeFlags) -> String {
    if attrs.is_empty() {
        return "NONE".to_string();
    }
    if attrs == FileAttributeFlags::FILE_ATTRIBUTE_NORMAL {
        return "NORMAL".to_string();
    }
    ATTRIBUTE_TOKENS
        .iter()
        .filter(|(bit, _)| attrs.contains(*bit))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Renders the Hotkey field's low byte (virtual key code) per MS-SHLLINK.
/// `0x90` is NUM LOCK and `0x91` is SCROLL LOCK; the reference tool aliases
/// `0x90` to both via an unreachable duplicate branch, which this rewrite
/// treats as a bug rather than reproducing (see DESIGN.md).
pub fn format_hotkey_key(low: u8) -> String {
    match low {
        0x30..=0x5A => format!("'{}'", low as char),
        0x70..=0x87 => format!("'F{}'", low as u32 - 111),
        0x90 => "'NUM LOCK'".to_string(),
        0x91 => "'SCROLL LOCK'".to_string(),
        0x00 => NOT_SET.to_string(),
        _ => format!("'<unknown 0x{low:02X}>'"),
    }
}

/// Renders the Hotkey field's high byte (modifier bitfield) as
/// `SHIFT | CTRL | ALT`-style tokens.
pub fn format_hotkey_modifiers(high: u8) -> String {
    let mut tokens = Vec::new();
    if high & 0x01 != 0 {
        tokens.push("SHIFT");
    }
    if high & 0x02 != 0 {
        tokens.push("CTRL");
    }
    if high & 0x04 != 0 {
        tokens.push("ALT");
    }
    if tokens.is_empty() {
        NOT_SET.to_string()
    } else {
        tokens.join(" | ")
    }
}

/// Renders the ShowCommand field. Any value other than the two recognized
/// ones collapses to `SW_SHOWNORMAL`, per the resolved Open Question in
/// DESIGN.md (the decoder keeps the raw `u32`; only the formatter maps it).
pub fn format_show_state(show_state: u32) -> &'static str {
    match show_state {
        0x3 => "SW_SHOWMAXIMIZED",
        0x7 => "SW_SHOWMINNOACTIVE",
        _ => "SW_SHOWNORMAL",
    }
}

/// `0x%08X`-style hex rendering used for flag/signature fields.
pub fn format_hex32(value: u32) -> String {
    format!("0x{value:08X}")
}

/// FILETIME short/long display pair, re-exported at the formatter boundary
/// so callers don't need to reach into `crate::filetime` directly.
pub fn format_filetime(ft: i64) -> (String, String) {
    filetime_to_iso(ft)
}

/// The seven DriveType values named in §4.4, rendered as the reference
/// tool's `DRIVE_*` tokens. Unrecognized codes render as a hex fallback.
pub fn format_drive_type(raw: u32) -> String {
    match raw {
        0x00 => "DRIVE_UNKNOWN".to_string(),
        0x01 => "DRIVE_NO_ROOT_DIR".to_string(),
        0x02 => "DRIVE_REMOVABLE".to_string(),
        0x03 => "DRIVE_FIXED".to_string(),
        0x04 => "DRIVE_REMOTE".to_string(),
        0x05 => "DRIVE_CDROM".to_string(),
        0x06 => "DRIVE_RAMDISK".to_string(),
        other => format!("DRIVE_UNKNOWN (0x{other:08X})"),
    }
}

/// Renders a drive serial number as bare uppercase hex (no `0x` prefix,
/// matching the reference tool's `DEADBEEF`-style rendering).
pub fn format_drive_serial(serial: u32) -> String {
    format!("{serial:08X}")
}

/// Renders a WNNC network provider code. Recognized codes render as the
/// literal `WNNC_NET_*` token the reference tool prints; unrecognized ones
/// (including `0`, which the reference tool calls out explicitly as
/// "possibly local") render as the bracketed fallback used throughout this
/// format.
pub fn format_network_provider(raw: u32) -> String {
    use crate::linkinfo::NetworkProviderType;
    match NetworkProviderType::from_raw(raw) {
        Some(known) => wnnc_token(known).to_string(),
        None => "[UNKNOWN (Possibly Local Server)]".to_string(),
    }
}

/// The literal `WNNC_NET_*` string the reference tool prints for each
/// recognized provider code (liblife.c:773-893).
fn wnnc_token(provider: crate::linkinfo::NetworkProviderType) -> &'static str {
    use crate::linkinfo::NetworkProviderType::*;
    match provider {
        Avid => "WNNC_NET_AVID",
        Docuspace => "WNNC_NET_DOCUSPACE",
        Mangosoft => "WNNC_NET_MANGOSOFT",
        Sernet => "WNNC_NET_SERNET",
        Riverfront1 => "WNNC_NET_RIVERFRONT1",
        Riverfront2 => "WNNC_NET_RIVERFRONT2",
        Decorb => "WNNC_NET_DECORB",
        Protstor => "WNNC_NET_PROTSTOR",
        FjRedir => "WNNC_NET_FJ_REDIR",
        Distinct => "WNNC_NET_DISTINCT",
        Twins => "WNNC_NET_TWINS",
        Rdr2Sample => "WNNC_NET_RDR2SAMPLE",
        CSC => "WNNC_NET_CSC",
        _3In1 => "WNNC_NET_3IN1",
        ExtendNet => "WNNC_NET_EXTENDNET",
        Stac => "WNNC_NET_STAC",
        Foxbat => "WNNC_NET_FOXBAT",
        Yahoo => "WNNC_NET_YAHOO",
        Exifs => "WNNC_NET_EXIFS",
        Dav => "WNNC_NET_DAV",
        Knoware => "WNNC_NET_KNOWARE",
        ObjectDire => "WNNC_NET_OBJECT_DIRE",
        Masfax => "WNNC_NET_MASFAX",
        HobNfs => "WNNC_NET_HOB_NFS",
        Shiva => "WNNC_NET_SHIVA",
        Ibmal => "WNNC_NET_IBMAL",
        Lock => "WNNC_NET_LOCK",
        Termsrv => "WNNC_NET_TERMSRV",
        Srt => "WNNC_NET_SRT",
        Quincy => "WNNC_NET_QUINCY",
        Openafs => "WNNC_NET_OPENAFS",
        Avid1 => "WNNC_NET_AVID1",
        Dfs => "WNNC_NET_DFS",
        Kwnp => "WNNC_NET_KWNP",
        Zenworks => "WNNC_NET_ZENWORKS",
        Driveonweb => "WNNC_NET_DRIVEONWEB",
        Vmware => "WNNC_NET_VMWARE",
        Rsfx => "WNNC_NET_RSFX",
        Mfiles => "WNNC_NET_MFILES",
        MsNfs => "WNNC_NET_MS_NFS",
        Google => "WNNC_NET_GOOGLE",
    }
}

/// CommonNetworkRelativeLink flag tokens. The reference tool switches on the
/// literal combined value rather than testing each bit independently, so a
/// value outside `0..=3` (unreachable through the bitflags type itself, but
/// possible from the raw `u32` on disk) renders as `[INVALID VALUE]` instead
/// of silently dropping unrecognized bits.
pub fn format_cnrl_flags(flags: crate::linkinfo::CommonNetworkRelativeLinkFlags) -> String {
    match flags.bits() {
        0 => "[NO FLAGS SET]".to_string(),
        1 => "ValidDevice".to_string(),
        2 => "ValidNetType".to_string(),
        3 => "ValidDevice | ValidNetType".to_string(),
        _ => "[INVALID VALUE]".to_string(),
    }
}

/// GUID/UUID fields expanded to braced string, version, variant, and (for
/// version 1) time/clock-sequence/node, matching the reference tool's
/// `Droid1`/`Droid2`/`DroidBirth1`/`DroidBirth2` rendering.
pub struct GuidDisplay {
    pub braced: String,
    pub version: String,
    pub variant: &'static str,
    /// `Some` only for version-1 GUIDs.
    pub time: Option<(String, String)>,
    pub clock_sequence: Option<u16>,
    pub node: Option<String>,
}

pub fn describe_guid(guid: &Guid) -> GuidDisplay {
    let is_v1 = guid.version() == 1;
    GuidDisplay {
        braced: guid.braced_string(),
        version: guid.version_name(),
        variant: guid.variant_name(),
        time: is_v1.then(|| format_filetime(guid.time_as_filetime())),
        clock_sequence: is_v1.then(|| guid.clock_sequence()),
        node: is_v1.then(|| guid.node_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_link_flags_render_empty() {
        assert_eq!(format_link_flags(LinkFlags::empty()), "");
    }

    #[test]
    fn link_flags_render_in_bit_order() {
        let flags = LinkFlags::HAS_LINK_INFO | LinkFlags::HAS_LINK_TARGET_ID_LIST;
        assert_eq!(format_link_flags(flags), "TARGET_ID_LIST | LINK_INFO");
    }

    #[test]
    fn zero_attributes_render_none() {
        assert_eq!(format_attributes(FileAttributeFlags::empty()), "NONE");
    }

    #[test]
    fn lone_normal_attribute_renders_normal() {
        assert_eq!(
            format_attributes(FileAttributeFlags::FILE_ATTRIBUTE_NORMAL),
            "NORMAL"
        );
    }

    #[test]
    fn hotkey_letter_key_renders_char() {
        assert_eq!(format_hotkey_key(0x41), "'A'");
    }

    #[test]
    fn hotkey_function_key_renders_index() {
        assert_eq!(format_hotkey_key(0x70), "'F1'");
    }

    #[test]
    fn hotkey_num_lock_and_scroll_lock_are_distinct() {
        assert_eq!(format_hotkey_key(0x90), "'NUM LOCK'");
        assert_eq!(format_hotkey_key(0x91), "'SCROLL LOCK'");
    }

    #[test]
    fn show_state_unrecognized_value_collapses_to_normal() {
        assert_eq!(format_show_state(0xFFFF), "SW_SHOWNORMAL");
        assert_eq!(format_show_state(0x3), "SW_SHOWMAXIMIZED");
    }

    #[test]
    fn unknown_network_provider_renders_bracketed_fallback() {
        assert_eq!(format_network_provider(0), "[UNKNOWN (Possibly Local Server)]");
    }

    #[test]
    fn recognized_network_provider_renders_wnnc_token() {
        assert_eq!(format_network_provider(0x001A0000), "WNNC_NET_AVID");
        assert_eq!(format_network_provider(0x00270000), "WNNC_NET_3IN1");
        assert_eq!(format_network_provider(0x00220000), "WNNC_NET_FJ_REDIR");
    }
}

//! Lays out a decoded [`lnkcore::ShellLink`] as TXT, CSV, or TSV. All of the
//! actual field rendering rules live in [`lnkcore::formatter`]; this module
//! only decides section banners, separators, and field ordering.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use lnkcore::extradata::{ExtraDataBlock, ExtraDataKind};
use lnkcore::formatter::{
    self, describe_guid, format_attributes, format_cnrl_flags, format_drive_serial,
    format_drive_type, format_hex32, format_hotkey_key, format_hotkey_modifiers,
    format_link_flags, format_network_provider, format_show_state, render_optional_string,
    EMPTY, NOT_APPLICABLE, NOT_SET, NOT_USED,
};
use lnkcore::linkinfo::LinkInfo;
use lnkcore::ShellLink;

/// The threaded-not-global output configuration (§4.11): constructed once
/// from parsed CLI arguments and passed by reference into every render
/// call, never read back out of module-level state.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub output: OutputFormat,
    pub short_form: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Txt,
}

type Field = (&'static str, String);

/// One bannered group of fields, in the same order `lifer`'s `text_out`
/// prints them: header, TargetIDList, LinkInfo (with VolumeID and CNRL
/// sub-banners folded into the same group), StringData, ExtraData.
struct Section {
    banner: &'static str,
    fields: Vec<Field>,
}

fn file_times(path: &Path) -> (String, String, String) {
    let fmt = |t: std::io::Result<std::time::SystemTime>| -> String {
        match t {
            Ok(t) => DateTime::<Utc>::from(t).format("%Y-%m-%d %H:%M:%S (UTC)").to_string(),
            Err(_) => NOT_APPLICABLE.to_string(),
        }
    };
    match std::fs::metadata(path) {
        Ok(m) => (fmt(m.accessed()), fmt(m.modified()), fmt(m.created())),
        Err(_) => (
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
        ),
    }
}

fn formatter_value(s: &str) -> String {
    if s.is_empty() {
        EMPTY.to_string()
    } else {
        lnkcore::stringdata::display_capped(s)
    }
}

fn extra_kind_name(kind: &ExtraDataKind) -> &'static str {
    match kind {
        ExtraDataKind::EnvironmentVariable => "ENVIRONMENT_VARIABLE",
        ExtraDataKind::Console => "CONSOLE_PROPS",
        ExtraDataKind::Tracker => "TRACKER_PROPS",
        ExtraDataKind::ConsoleFE => "CONSOLE_FE_PROPS",
        ExtraDataKind::SpecialFolder => "SPECIAL_FOLDER_PROPS",
        ExtraDataKind::Darwin => "DARWIN_PROPS",
        ExtraDataKind::IconEnvironment => "ICON_ENVIRONMENT_PROPS",
        ExtraDataKind::Shim => "SHIM_PROPS",
        ExtraDataKind::PropertyStore => "PROPERTY_STORE_PROPS",
        ExtraDataKind::VistaAndAboveIdList => "VISTA_AND_ABOVE_IDLIST_PROPS",
        ExtraDataKind::KnownFolder => "KNOWN_FOLDER_PROPS",
    }
}

fn header_section(path: &Path, link: &ShellLink, config: &Config) -> Section {
    let header = link.header();
    let (atime, mtime, ctime) = file_times(path);
    let mut fields = vec![("File Name", path.display().to_string())];

    if !config.short_form {
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        fields.push(("File Size", size.to_string()));
    }
    fields.push(("Last Accessed", atime));
    fields.push(("Last Modified", mtime));
    fields.push(("Created", ctime));

    fields.push(("Header Size", format_hex32(header.header_size())));
    fields.push(("Link File Class ID", header.clsid().braced_string()));
    fields.push(("Flags", format_link_flags(header.link_flags())));
    fields.push(("Attributes", format_attributes(header.file_attributes())));

    if !config.short_form {
        let (ct_short, ct_long) = formatter::format_filetime(header.creation_time());
        let (at_short, at_long) = formatter::format_filetime(header.access_time());
        let (wt_short, wt_long) = formatter::format_filetime(header.write_time());
        fields.push(("Creation Time", format!("{ct_short} ({ct_long})")));
        fields.push(("Access Time", format!("{at_short} ({at_long})")));
        fields.push(("Write Time", format!("{wt_short} ({wt_long})")));
    }
    fields.push(("Target Size", header.target_size().to_string()));
    fields.push(("Icon Index", header.icon_index().to_string()));
    fields.push(("Window State", format_show_state(header.show_state()).to_string()));
    fields.push((
        "Hot Keys",
        format!(
            "{} {}",
            format_hotkey_modifiers(header.hotkey_high().bits()),
            format_hotkey_key(header.hotkey_low())
        ),
    ));
    if !config.short_form {
        fields.push(("Reserved1", header.reserved1().to_string()));
        fields.push(("Reserved2", header.reserved2().to_string()));
        fields.push(("Reserved3", header.reserved3().to_string()));
    }

    Section {
        banner: "  {LINK FILE - HEADER}",
        fields,
    }
}

fn id_list_section(link: &ShellLink) -> Section {
    let fields = match link.target_id_list() {
        Some(list) => vec![
            ("IDList Size", list.list_size().to_string()),
            ("Number of Items", list.num_items().to_string()),
        ],
        None => vec![
            ("IDList Size", NOT_APPLICABLE.to_string()),
            ("Number of Items", NOT_APPLICABLE.to_string()),
        ],
    };
    Section {
        banner: "  {LINK FILE - TARGET ID LIST}",
        fields,
    }
}

fn link_info_fields(info: &LinkInfo) -> Vec<Field> {
    let mut fields = Vec::new();

    match &info.volume_id {
        Some(vol) => {
            fields.push(("Drive Type", format_drive_type(vol.drive_type)));
            fields.push(("Drive Serial No", format_drive_serial(vol.drive_serial_number)));
            fields.push((
                "Volume Label",
                if info.header_size >= 0x24 {
                    NOT_USED.to_string()
                } else {
                    render_optional_string(&vol.volume_label, NOT_SET)
                },
            ));
            fields.push((
                "Volume LabelU",
                if info.header_size >= 0x24 {
                    render_optional_string(&vol.volume_label_u, NOT_SET)
                } else {
                    NOT_USED.to_string()
                },
            ));
        }
        None => {
            fields.push(("Drive Type", NOT_APPLICABLE.to_string()));
            fields.push(("Drive Serial No", NOT_APPLICABLE.to_string()));
            fields.push(("Volume Label", NOT_APPLICABLE.to_string()));
            fields.push(("Volume LabelU", NOT_APPLICABLE.to_string()));
        }
    }
    fields.push(("Local Base Path", render_optional_string(&info.local_base_path, NOT_APPLICABLE)));
    fields.push((
        "Local Base PathU",
        render_optional_string(&info.local_base_path_u, NOT_APPLICABLE),
    ));

    match &info.cnrl {
        Some(cnrl) => {
            fields.push(("CNR Flags", format_cnrl_flags(cnrl.flags)));
            fields.push(("Net Provider Type", format_network_provider(cnrl.network_provider_type)));
            fields.push(("Net Name", render_optional_string(&cnrl.net_name, NOT_SET)));
            fields.push(("Device Name", render_optional_string(&cnrl.device_name, NOT_APPLICABLE)));
            fields.push(("Net NameU", render_optional_string(&cnrl.net_name_u, NOT_USED)));
            fields.push(("Device NameU", render_optional_string(&cnrl.device_name_u, NOT_USED)));
        }
        None => {
            fields.push(("CNR Flags", NOT_APPLICABLE.to_string()));
            fields.push(("Net Provider Type", NOT_APPLICABLE.to_string()));
            fields.push(("Net Name", NOT_APPLICABLE.to_string()));
            fields.push(("Device Name", NOT_APPLICABLE.to_string()));
            fields.push(("Net NameU", NOT_APPLICABLE.to_string()));
            fields.push(("Device NameU", NOT_APPLICABLE.to_string()));
        }
    }
    fields.push((
        "Common Path Suffix",
        render_optional_string(&info.common_path_suffix, NOT_SET),
    ));
    fields.push((
        "Common Path SuffixU",
        render_optional_string(&info.common_path_suffix_u, NOT_USED),
    ));

    fields
}

/// The same 14 labels `link_info_fields` emits for a present `LinkInfo`,
/// all `[N/A]`. Keeping the label set identical whether or not `LinkInfo`
/// decoded keeps CSV/TSV column count stable across records.
fn absent_link_info_fields() -> Vec<Field> {
    [
        "Drive Type",
        "Drive Serial No",
        "Volume Label",
        "Volume LabelU",
        "Local Base Path",
        "Local Base PathU",
        "CNR Flags",
        "Net Provider Type",
        "Net Name",
        "Device Name",
        "Net NameU",
        "Device NameU",
        "Common Path Suffix",
        "Common Path SuffixU",
    ]
    .into_iter()
    .map(|label| (label, NOT_APPLICABLE.to_string()))
    .collect()
}

fn link_info_section(link: &ShellLink) -> Section {
    let fields = match link.link_info() {
        Some(info) => link_info_fields(info),
        None => absent_link_info_fields(),
    };
    Section {
        banner: "  {LINK FILE - LINK INFO}",
        fields,
    }
}

fn string_data_section(link: &ShellLink) -> Section {
    let sd = link.string_data();
    let mut fields = Vec::new();
    for (label, entry) in [
        ("Name String", &sd.name),
        ("Relative Path", &sd.relative_path),
        ("Working Dir", &sd.working_dir),
        ("Cmd Line Args", &sd.arguments),
        ("Icon Location", &sd.icon_location),
    ] {
        match entry {
            Some(e) => fields.push((label, format!("({}) {}", e.count_chars, formatter_value(&e.value)))),
            None => fields.push((label, NOT_SET.to_string())),
        }
    }
    Section {
        banner: "  {LINK FILE - STRING DATA}",
        fields,
    }
}

fn push_extra_block_fields(fields: &mut Vec<Field>, block: &ExtraDataBlock) {
    match block {
        ExtraDataBlock::SpecialFolder(sf) => {
            fields.push(("Folder ID", sf.special_folder_id.to_string()));
            fields.push(("Offset", sf.offset.to_string()));
        }
        ExtraDataBlock::KnownFolder(kf) => {
            fields.push(("Folder ID", kf.known_folder_id.braced_string()));
            fields.push(("Offset", kf.offset.to_string()));
        }
        ExtraDataBlock::Tracker(t) => {
            fields.push(("Length", t.length.to_string()));
            fields.push(("Version", t.version.to_string()));
            fields.push(("MachineID", t.machine_id.clone()));
            for (label, guid) in [
                ("Droid1", &t.droid1),
                ("Droid2", &t.droid2),
                ("DroidBirth1", &t.droid_birth1),
                ("DroidBirth2", &t.droid_birth2),
            ] {
                let d = describe_guid(guid);
                fields.push((label, d.braced));
                fields.push(("UUID Version", d.version));
                fields.push(("UUID Variant", d.variant.to_string()));
                if let Some((short, _)) = d.time {
                    fields.push(("UUID Time", short));
                }
                if let Some(seq) = d.clock_sequence {
                    fields.push(("UUID Sequence", seq.to_string()));
                }
                if let Some(node) = d.node {
                    fields.push(("UUID Node (MAC)", node));
                }
            }
        }
        ExtraDataBlock::VistaAndAboveIdList(v) => {
            fields.push(("Number of Items", v.num_item_ids.to_string()));
        }
        ExtraDataBlock::Shim(s) => {
            fields.push(("Layer Name", s.layer_name.clone()));
        }
        ExtraDataBlock::PropertyStore { num_stores } => {
            fields.push(("Number of Stores", num_stores.to_string()));
        }
        ExtraDataBlock::EnvironmentVariable(meta)
        | ExtraDataBlock::Console(meta)
        | ExtraDataBlock::ConsoleFE(meta)
        | ExtraDataBlock::Darwin(meta)
        | ExtraDataBlock::IconEnvironment(meta)
        | ExtraDataBlock::Unknown(meta) => {
            fields.push(("BlockSize", meta.size.to_string()));
            fields.push(("BlockSignature", format_hex32(meta.signature)));
        }
    }
}

fn extra_data_section(link: &ShellLink) -> Section {
    let extra = link.extra_data();
    let mut fields = vec![(
        "Extra Data Types",
        if extra.types_present().is_empty() {
            NOT_SET.to_string()
        } else {
            extra.types_present().iter().map(extra_kind_name).collect::<Vec<_>>().join(" | ")
        },
    )];
    fields.push(("Extra Data Size", extra.size.to_string()));
    for block in &extra.blocks {
        push_extra_block_fields(&mut fields, block);
    }
    Section {
        banner: "  {LINK FILE - EXTRA DATA}",
        fields,
    }
}

fn sections(path: &Path, link: &ShellLink, config: &Config) -> Vec<Section> {
    vec![
        header_section(path, link, config),
        id_list_section(link),
        link_info_section(link),
        string_data_section(link),
        extra_data_section(link),
    ]
}

/// The flat, ordered label set the CSV/TSV header row uses. Header, target
/// ID list, link info, and string data labels are stable across every
/// record regardless of which optional fields are present (those absent
/// render as `[N/A]`/`[NOT SET]` instead of shrinking the column count).
/// Extra data block labels are the exception: a record's row carries one
/// label pair per block it actually has, so the header row reflects only
/// the blockless baseline (Extra Data Types, Extra Data Size) and a row
/// with TrackerData or PropertyStore blocks runs past it. This mirrors
/// `lifer`'s own CSV mode, which has the same caveat.
fn flat_labels(config: &Config) -> Vec<&'static str> {
    let dummy_path = Path::new("");
    let dummy = minimal_header_dummy();
    sections(dummy_path, &dummy, config)
        .into_iter()
        .flat_map(|s| s.fields)
        .map(|(label, _)| label)
        .collect()
}

/// A minimal well-formed record, used only to read off the label set for
/// the CSV/TSV header row. LinkInfo/TargetIDList/ExtraData all being absent
/// here is fine: their absent branches use the same labels the present
/// branches do, just with `[N/A]` values.
fn minimal_header_dummy() -> ShellLink {
    let mut buf = vec![0u8; 76];
    buf[0..4].copy_from_slice(&0x4Cu32.to_le_bytes());
    buf[4..8].copy_from_slice(&0x0002_1401u32.to_le_bytes());
    buf[12..14].copy_from_slice(&[0xC0, 0x00]);
    buf[14..20].copy_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x46]);
    ShellLink::from_bytes(&buf).expect("minimal header is always well-formed")
}

pub fn header_row(config: &Config) -> String {
    let sep = match config.output {
        OutputFormat::Csv => ',',
        OutputFormat::Tsv => '\t',
        OutputFormat::Txt => unreachable!("header_row is only used for tabular output"),
    };
    flat_labels(config).join(&sep.to_string())
}

pub fn render_row(path: &Path, link: &ShellLink, config: &Config, sep: u8) -> String {
    let sep = sep as char;
    sections(path, link, config)
        .into_iter()
        .flat_map(|s| s.fields)
        .map(|(_, value)| csv_escape(&value, sep))
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}

fn csv_escape(value: &str, sep: char) -> String {
    if value.contains(sep) || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_txt(path: &Path, link: &ShellLink, config: &Config) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "LINK FILE -------------- {}", path.display());

    for section in sections(path, link, config) {
        let _ = writeln!(s, "{}", section.banner);
        if section.banner == "  {LINK FILE - LINK INFO}" && link.link_info().is_some() {
            let _ = writeln!(s, "    {{LINK INFO - VOLUME ID}}");
        }
        for (label, value) in &section.fields {
            let _ = writeln!(s, "    {label}: {value}");
            if *label == "Local Base PathU" {
                let _ = writeln!(s, "    {{LINK INFO - COMMON NETWORK RELATIVE LINK}}");
            }
        }
    }

    s.trim_end().to_string()
}

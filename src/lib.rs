#![warn(missing_docs)]

//! # Shell Link parser for Rust.
//!
//! Parses Windows shortcut (`.lnk`) files per [MS-SHLLINK] into a strongly
//! typed record: the fixed header, the optional TargetIDList, LinkInfo,
//! StringData strings, and ExtraData blocks. Reading is the only supported
//! direction — this crate does not write `.lnk` files.
//!
//! To get started, see the [`ShellLink`] struct.
//!
//! [MS-SHLLINK]: https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-shllink/16cb4ca1-9339-4d0c-a68d-bf1d6cc0f943
//!
//! ## Example
//!
//! ```no_run
//! let shortcut = lnkcore::ShellLink::open("target.lnk").unwrap();
//! println!("{:#?}", shortcut);
//! ```

#[allow(unused)]
use log::{debug, trace, warn};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

mod bytereader;

pub mod validator;

pub mod guid;
pub use guid::Guid;

pub mod filetime;

/// The ShellLinkHeader structure (section 2.1) and its bitflag fields.
pub mod header;
pub use header::{FileAttributeFlags, HotkeyModifiers, LinkFlags, ShellLinkHeader};

/// The LinkTargetIDList structure (section 2.2): present when
/// [`LinkFlags::HAS_LINK_TARGET_ID_LIST`] is set in the header.
pub mod idlist;
pub use idlist::TargetIdList;

/// The LinkInfo structure (section 2.3): specifies information necessary to
/// resolve a link target if it is not found in its original location.
pub mod linkinfo;
pub use linkinfo::LinkInfo;

/// The StringData structures (section 2.4): the optional Name, RelativePath,
/// WorkingDir, Arguments, and IconLocation strings.
pub mod stringdata;
pub use stringdata::StringData;

/// The ExtraData structures (section 2.5): a sequence of property blocks
/// appended after StringData.
pub mod extradata;
pub use extradata::ExtraData;

/// Rendering of a decoded [`ShellLink`] into the display strings the
/// `lnkdump` binary lays out as text/CSV/TSV.
pub mod formatter;

mod error;
pub use error::Error;

/// A parsed Windows shortcut file.
///
/// Built by [`ShellLink::open`] or [`ShellLink::from_bytes`]. The header is
/// always present; every other field is `None` when its corresponding
/// [`LinkFlags`] bit is clear, exactly as the on-disk format specifies.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShellLink {
    header: ShellLinkHeader,
    target_id_list: Option<TargetIdList>,
    link_info: Option<LinkInfo>,
    string_data: StringData,
    extra_data: ExtraData,
}

impl ShellLink {
    /// Opens and parses a shell link from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("opening {path:?}");
        let mut reader = BufReader::new(File::open(path)?);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Parses a shell link from an in-memory buffer.
    ///
    /// Validates the fixed header first (CLSID, reserved fields, header
    /// size); a file that fails validation is rejected outright since
    /// nothing downstream can be trusted to mean what the format says it
    /// means. Once the header validates, `TargetIDList` and `StringData`
    /// truncation are likewise hard errors, but a malformed `LinkInfo` or
    /// `ExtraData` sub-field degrades that one field to `None`/a raw
    /// fallback and logs a warning rather than failing the whole parse.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        validator::validate(data)?;

        let header = ShellLinkHeader::read(data)?;
        debug!("header: {header:#?}");
        let link_flags = header.link_flags();

        let mut pos = 76usize;

        let target_id_list = if link_flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
            let (list, consumed) = TargetIdList::read(data, pos)?;
            trace!("target id list: {list:?} ({consumed} bytes)");
            pos += consumed;
            Some(list)
        } else {
            None
        };

        let link_info = if link_flags.contains(LinkFlags::HAS_LINK_INFO) {
            match LinkInfo::read(data, pos) {
                Ok((info, consumed)) => {
                    trace!("link info: {consumed} bytes");
                    pos += consumed;
                    Some(info)
                }
                Err(e) => {
                    warn!("LinkInfo malformed, omitting: {e}");
                    None
                }
            }
        } else {
            None
        };

        let unicode = link_flags.contains(LinkFlags::IS_UNICODE);
        let string_data = StringData::read(data, pos, link_flags.bits(), unicode)?;
        pos += string_data.size as usize;

        let extra_data = ExtraData::read(data, pos).unwrap_or_else(|e| {
            warn!("ExtraData malformed, keeping whatever blocks decoded so far: {e}");
            ExtraData::default()
        });

        Ok(Self {
            header,
            target_id_list,
            link_info,
            string_data,
            extra_data,
        })
    }

    /// The fixed-size header every shell link file carries.
    pub fn header(&self) -> &ShellLinkHeader {
        &self.header
    }

    /// The TargetIDList, present when [`LinkFlags::HAS_LINK_TARGET_ID_LIST`]
    /// is set.
    pub fn target_id_list(&self) -> Option<&TargetIdList> {
        self.target_id_list.as_ref()
    }

    /// The LinkInfo block, present when [`LinkFlags::HAS_LINK_INFO`] is set
    /// (and the block itself decoded cleanly).
    pub fn link_info(&self) -> Option<&LinkInfo> {
        self.link_info.as_ref()
    }

    /// The optional Name/RelativePath/WorkingDir/Arguments/IconLocation
    /// strings.
    pub fn string_data(&self) -> &StringData {
        &self.string_data
    }

    /// The ExtraData property blocks trailing the record.
    pub fn extra_data(&self) -> &ExtraData {
        &self.extra_data
    }
}

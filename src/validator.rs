use thiserror::Error as ThisError;

use crate::bytereader::{read_u16_le, read_u32_le};
use crate::Error;

/// The CLSID every valid shell link header must carry:
/// `{00021401-0000-0000-C000-000000000046}`.
const CLSID_DATA1: u32 = 0x0002_1401;
const CLSID_DATA2: u16 = 0x0000;
const CLSID_DATA3: u16 = 0x0000;
const CLSID_DATA4_HI: [u8; 2] = [0xC0, 0x00];
const CLSID_DATA4_LO: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x46];

/// Reason a candidate shell link file failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ValidationError {
    #[error("header_size is not 0x4C")]
    BadHeaderSize,
    #[error("CLSID Data1 does not match the shell link CLSID")]
    BadClsidData1,
    #[error("CLSID Data2 does not match the shell link CLSID")]
    BadClsidData2,
    #[error("CLSID Data3 does not match the shell link CLSID")]
    BadClsidData3,
    #[error("CLSID Data4 (high, clock-seq bytes) does not match the shell link CLSID")]
    BadClsidData4Hi,
    #[error("CLSID Data4 (low, node bytes) does not match the shell link CLSID")]
    BadClsidData4Lo,
    #[error("reserved field 1 is not zero")]
    BadReserved1,
    #[error("reserved field 2 is not zero")]
    BadReserved2,
    #[error("reserved field 3 is not zero")]
    BadReserved3,
}

/// Validates the first 76 bytes of a candidate shell link file without
/// consuming anything beyond them. Checks every CLSID byte group and every
/// reserved field independently and reports the first mismatch found in
/// `Data1, Data2, Data3, Data4Hi, Data4Lo, Reserved1, Reserved2, Reserved3`
/// order, rather than stopping at whichever the reference implementation's
/// early-return order happened to check first.
pub fn validate(buf: &[u8]) -> Result<(), Error> {
    if buf.len() < 76 {
        return Err(Error::TruncatedHeader {
            pos: 0,
            needed: 76,
            available: buf.len(),
        });
    }

    let header_size = read_u32_le(buf, 0)?;
    if header_size != 0x4C {
        return Err(Error::NotAShellLink(ValidationError::BadHeaderSize));
    }

    let data1 = read_u32_le(buf, 4)?;
    let data2 = read_u16_le(buf, 8)?;
    let data3 = read_u16_le(buf, 10)?;
    let data4_hi = [buf[12], buf[13]];
    let data4_lo = [buf[14], buf[15], buf[16], buf[17], buf[18], buf[19]];

    if data1 != CLSID_DATA1 {
        return Err(Error::NotAShellLink(ValidationError::BadClsidData1));
    }
    if data2 != CLSID_DATA2 {
        return Err(Error::NotAShellLink(ValidationError::BadClsidData2));
    }
    if data3 != CLSID_DATA3 {
        return Err(Error::NotAShellLink(ValidationError::BadClsidData3));
    }
    if data4_hi != CLSID_DATA4_HI {
        return Err(Error::NotAShellLink(ValidationError::BadClsidData4Hi));
    }
    if data4_lo != CLSID_DATA4_LO {
        return Err(Error::NotAShellLink(ValidationError::BadClsidData4Lo));
    }

    let reserved1 = read_u16_le(buf, 66)?;
    if reserved1 != 0 {
        return Err(Error::NotAShellLink(ValidationError::BadReserved1));
    }
    let reserved2 = read_u32_le(buf, 68)?;
    if reserved2 != 0 {
        return Err(Error::NotAShellLink(ValidationError::BadReserved2));
    }
    let reserved3 = read_u32_le(buf, 72)?;
    if reserved3 != 0 {
        return Err(Error::NotAShellLink(ValidationError::BadReserved3));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_header() -> Vec<u8> {
        let mut buf = vec![0u8; 76];
        buf[0..4].copy_from_slice(&0x4Cu32.to_le_bytes());
        buf[4..8].copy_from_slice(&CLSID_DATA1.to_le_bytes());
        buf[8..10].copy_from_slice(&CLSID_DATA2.to_le_bytes());
        buf[10..12].copy_from_slice(&CLSID_DATA3.to_le_bytes());
        buf[12..14].copy_from_slice(&CLSID_DATA4_HI);
        buf[14..20].copy_from_slice(&CLSID_DATA4_LO);
        buf
    }

    #[test]
    fn accepts_minimal_valid_header() {
        assert!(validate(&valid_header()).is_ok());
    }

    #[test]
    fn rejects_bad_data1_with_specific_code() {
        let mut buf = valid_header();
        buf[4..8].copy_from_slice(&0x0002_1400u32.to_le_bytes());
        match validate(&buf) {
            Err(Error::NotAShellLink(ValidationError::BadClsidData1)) => {}
            other => panic!("expected BadClsidData1, got {other:?}"),
        }
    }

    #[test]
    fn rejects_too_short_buffer() {
        let buf = vec![0u8; 10];
        assert!(matches!(validate(&buf), Err(Error::TruncatedHeader { .. })));
    }

    #[test]
    fn rejects_nonzero_reserved_field() {
        let mut buf = valid_header();
        buf[66..68].copy_from_slice(&1u16.to_le_bytes());
        match validate(&buf) {
            Err(Error::NotAShellLink(ValidationError::BadReserved1)) => {}
            other => panic!("expected BadReserved1, got {other:?}"),
        }
    }
}

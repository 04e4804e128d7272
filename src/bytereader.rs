use byteorder::{ByteOrder, LE};

use crate::Error;

/// Fixed-offset little-endian reads against a whole slice. Every decoder in
/// this crate is built on these: each field sits at a known offset from the
/// start of its structure, and a short buffer is reported as a `Truncated`
/// error rather than panicking.
pub fn read_u16_le(buf: &[u8], off: usize) -> Result<u16, Error> {
    require(buf, off, 2)?;
    Ok(LE::read_u16(&buf[off..]))
}

pub fn read_u32_le(buf: &[u8], off: usize) -> Result<u32, Error> {
    require(buf, off, 4)?;
    Ok(LE::read_u32(&buf[off..]))
}

pub fn read_u64_le(buf: &[u8], off: usize) -> Result<u64, Error> {
    require(buf, off, 8)?;
    Ok(LE::read_u64(&buf[off..]))
}

pub fn read_i32_le(buf: &[u8], off: usize) -> Result<i32, Error> {
    require(buf, off, 4)?;
    Ok(LE::read_i32(&buf[off..]))
}

pub fn read_i64_le(buf: &[u8], off: usize) -> Result<i64, Error> {
    require(buf, off, 8)?;
    Ok(LE::read_i64(&buf[off..]))
}

fn require(buf: &[u8], off: usize, width: usize) -> Result<(), Error> {
    if off + width > buf.len() {
        Err(Error::Truncated {
            pos: off,
            needed: width,
            available: buf.len().saturating_sub(off),
        })
    } else {
        Ok(())
    }
}

/// Reads bytes until NUL or `max_chars`, interpreting each byte as an 8-bit
/// passthrough character (bytes above 0x7F are kept as-is; this core does
/// not attempt code-page-aware decoding, matching the "display-safe" ANSI
/// treatment called for at the primitive-reader boundary).
pub fn read_ansi_cstr(buf: &[u8], off: usize, max_chars: usize) -> String {
    let mut s = String::new();
    for i in 0..max_chars {
        let Some(&b) = buf.get(off + i) else { break };
        if b == 0 {
            break;
        }
        s.push(b as char);
    }
    s
}

/// Reads UTF-16LE code units until a 0x0000 terminator or `max_chars - 1`.
/// Returns the decoded string and the count of code units written (not
/// including the terminator). On truncation, returns an empty string and
/// a negative sentinel count.
pub fn read_utf16le_cstr(buf: &[u8], off: usize, max_chars: usize) -> (String, i32) {
    let mut units = Vec::new();
    let mut i = 0usize;
    loop {
        if i >= max_chars.saturating_sub(1) {
            break;
        }
        let Ok(unit) = read_u16_le(buf, off + i * 2) else {
            return (String::new(), -1);
        };
        if unit == 0 {
            break;
        }
        units.push(unit);
        i += 1;
    }
    (String::from_utf16_lossy(&units), units.len() as i32)
}

//! Character-aware tail truncation.

use crate::error::{Result, RollingError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Remove the last `count` characters of `file`, returning its new length.
///
/// Trailing `\n`/`\r` bytes are skipped before counting starts, and any
/// `\n`/`\r` left directly in front of the cut are dropped too, so a file
/// ending in `}\n]` truncated by one character ends in `}`.
///
/// Characters are counted as UTF-8 leading bytes (`0xxxxxxx` or
/// `11xxxxxx`), which keeps a multi-byte character from being split.
/// Running into the start of the file before `count` characters were
/// found is a [`RollingError::MalformedLog`] and leaves the file untouched.
pub fn truncate_chars(file: &mut File, count: usize) -> Result<u64> {
    let len = file.metadata()?.len();

    let end = skip_newlines_back(file, len)?;

    let mut cut = end;
    let mut remaining = count;
    while remaining > 0 {
        if cut == 0 {
            return Err(RollingError::MalformedLog(format!(
                "cannot truncate {} characters from a {} byte file",
                count, len
            )));
        }
        cut -= 1;
        if is_leading_byte(byte_at(file, cut)?) {
            remaining -= 1;
        }
    }

    let cut = skip_newlines_back(file, cut)?;
    file.set_len(cut)?;
    Ok(cut)
}

/// Last byte before `end` that is not `\n` or `\r`, with its offset.
pub(crate) fn last_content_byte(file: &mut File, end: u64) -> Result<Option<(u64, u8)>> {
    let pos = skip_newlines_back(file, end)?;
    if pos == 0 {
        return Ok(None);
    }
    Ok(Some((pos - 1, byte_at(file, pos - 1)?)))
}

/// Last byte before `end` that is not JSON whitespace.
pub(crate) fn last_non_whitespace(file: &mut File, end: u64) -> Result<Option<u8>> {
    let mut pos = end;
    while pos > 0 {
        let b = byte_at(file, pos - 1)?;
        if !b.is_ascii_whitespace() {
            return Ok(Some(b));
        }
        pos -= 1;
    }
    Ok(None)
}

fn skip_newlines_back(file: &mut File, mut pos: u64) -> Result<u64> {
    while pos > 0 && is_newline(byte_at(file, pos - 1)?) {
        pos -= 1;
    }
    Ok(pos)
}

fn byte_at(file: &mut File, pos: u64) -> Result<u8> {
    file.seek(SeekFrom::Start(pos))?;
    let mut buf = [0u8; 1];
    file.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn is_newline(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn is_leading_byte(b: u8) -> bool {
    b & 0x80 == 0 || b & 0xC0 == 0xC0
}

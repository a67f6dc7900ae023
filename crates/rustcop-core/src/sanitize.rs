//! Line splitting and UTF-8 repair for raw file contents.
//!
//! Sanitizing is lossy: invalid byte sequences are dropped, not replaced
//! with U+FFFD, and no error or warning is produced. Text that was already
//! valid UTF-8 passes through unchanged.

use std::borrow::Cow;

/// Removes every invalid UTF-8 subsequence from `bytes`.
///
/// Returns the input borrowed when it is already valid, so sanitizing
/// valid text never allocates.
#[must_use]
pub fn sanitize_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(valid) => Cow::Borrowed(valid),
        Err(_) => Cow::Owned(drop_invalid(bytes)),
    }
}

fn drop_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    // Truncated sequence at the end of input.
                    None => return out,
                }
            }
        }
    }
}

/// Splits raw file contents into sanitized physical lines.
///
/// A trailing `\n`, `\r\n` or `\r` is stripped from each line. A final line
/// without a terminator still counts; empty input yields no lines.
#[must_use]
pub fn split_lines(content: &[u8]) -> Vec<String> {
    content
        .split_inclusive(|b| *b == b'\n')
        .map(|raw| {
            let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            sanitize_line(raw).into_owned()
        })
        .collect()
}

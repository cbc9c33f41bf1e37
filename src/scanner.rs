//! Sprite frame fragment scanner
//!
//! Build output embeds sprite frame records as JSON objects inside larger
//! files that are not JSON themselves (bundled scripts, concatenated packs).
//! The scanner finds them by literal matching instead of tokenizing:
//!
//! 1. all whitespace is stripped from the input, so pretty-printed and
//!    minified records look the same;
//! 2. each fragment starts at the marker `{"__type__":"cc.SpriteFrame"`;
//! 3. it ends at the next `}}`, which closes `content` and the wrapper.
//!
//! A `}}` inside a string value of the record truncates the fragment early.
//! The same heuristic is kept so output matches existing extractions; such
//! fragments fail to decode and are reported like any other bad fragment.

use std::path::Path;

use log::{debug, warn};

use crate::error::ExtractError;
use crate::models::SpriteFrame;

/// Start of every sprite frame fragment, after whitespace stripping.
pub const SPRITE_FRAME_MARKER: &str = r#"{"__type__":"cc.SpriteFrame""#;

/// End of a sprite frame fragment: closes `content`, then the wrapper.
pub const FRAGMENT_TERMINATOR: &str = "}}";

/// Bytes removed by [`strip_whitespace`]: space, tab, LF, CR, FF and VT.
fn is_stripped(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0c | 0x0b)
}

/// Remove every whitespace byte from the stream, including inside strings.
pub fn strip_whitespace(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().filter(|b| !is_stripped(*b)).collect()
}

/// Split already-stripped text into candidate fragments, in order.
///
/// Returns the fragments and whether the scan ended on a marker that had no
/// terminator after it.
pub fn extract_fragments(text: &str) -> (Vec<&str>, bool) {
    let mut fragments = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(SPRITE_FRAME_MARKER) {
        let candidate = &rest[start..];
        match candidate.find(FRAGMENT_TERMINATOR) {
            Some(end) => {
                let stop = end + FRAGMENT_TERMINATOR.len();
                fragments.push(&candidate[..stop]);
                rest = &candidate[stop..];
            }
            None => return (fragments, true),
        }
    }

    (fragments, false)
}

/// Outcome of scanning one input for sprite frames.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Decoded and normalized frames, in input order
    pub frames: Vec<SpriteFrame>,
    /// Fragments that could not be decoded
    pub errors: Vec<ExtractError>,
}

/// Scan raw bytes for sprite frame fragments and decode each one.
///
/// `source` is only used to label errors. Decoding failures never stop the scan.
pub fn scan_sprite_frames(bytes: &[u8], source: &Path) -> ScanOutcome {
    let stripped = strip_whitespace(bytes);
    let text = String::from_utf8_lossy(&stripped);
    let (fragments, truncated) = extract_fragments(&text);

    let mut outcome = ScanOutcome::default();
    for (index, fragment) in fragments.iter().enumerate() {
        match SpriteFrame::from_fragment(fragment) {
            Ok(frame) => {
                debug!(
                    "{}: sprite frame '{}' on texture {}",
                    source.display(),
                    frame.name,
                    frame.texture
                );
                outcome.frames.push(frame);
            }
            Err(e) => outcome.errors.push(ExtractError::decode(
                format!("sprite frame fragment #{} in '{}'", index, source.display()),
                e,
            )),
        }
    }

    if truncated {
        warn!("{}: sprite frame marker without terminator, scan stopped", source.display());
        outcome.errors.push(ExtractError::decode(
            format!("trailing sprite frame fragment in '{}'", source.display()),
            "no closing '}}' after marker",
        ));
    }

    outcome
}

/// Read and scan one file.
pub fn scan_file(path: &Path) -> Result<ScanOutcome, ExtractError> {
    let bytes = std::fs::read(path)
        .map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
    Ok(scan_sprite_frames(&bytes, path))
}

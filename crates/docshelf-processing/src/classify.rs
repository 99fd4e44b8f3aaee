//! Signature-based content classification.
//!
//! Only a bounded leading byte window is inspected; the filename and the
//! client-declared content type are never consulted. Unknown signatures
//! classify as `Other` (storable, not previewable).

use docshelf_core::models::FileKind;

/// Maximum number of leading bytes the classifier will look at.
pub const CLASSIFY_WINDOW: usize = 8192;

// UTF-16LE stream names inside OLE compound files, used to tell legacy
// office formats apart.
const OLE_WORKBOOK: &[u8] = b"W\0o\0r\0k\0b\0o\0o\0k\0";
const OLE_POWERPOINT: &[u8] = b"P\0o\0w\0e\0r\0P\0o\0i\0n\0t\0";

/// Classify a leading byte window into a document kind.
///
/// Deterministic: the same prefix always yields the same kind. Windows longer
/// than [`CLASSIFY_WINDOW`] are truncated before inspection.
pub fn classify(prefix: &[u8]) -> FileKind {
    let window = &prefix[..prefix.len().min(CLASSIFY_WINDOW)];

    if window.starts_with(b"%PDF") {
        return FileKind::Pdf;
    }

    if is_image(window) {
        return FileKind::Image;
    }

    if window.starts_with(b"PK\x03\x04") {
        return classify_ooxml(window);
    }

    if window.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        return classify_ole(window);
    }

    FileKind::Other
}

fn is_image(window: &[u8]) -> bool {
    window.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        || window.starts_with(&[0xFF, 0xD8, 0xFF])
        || window.starts_with(b"GIF87a")
        || window.starts_with(b"GIF89a")
        || window.starts_with(b"BM")
        || window.starts_with(b"II*\x00")
        || window.starts_with(b"MM\x00*")
        || (window.len() >= 12 && &window[0..4] == b"RIFF" && &window[8..12] == b"WEBP")
}

/// ZIP container: decide the OOXML flavor by the first package entry name
/// visible in the window. A ZIP without an office marker is just an archive.
fn classify_ooxml(window: &[u8]) -> FileKind {
    let word = find(window, b"word/");
    let excel = find(window, b"xl/");
    let ppt = find(window, b"ppt/");

    match earliest(&[
        (word, FileKind::Word),
        (excel, FileKind::Excel),
        (ppt, FileKind::Powerpoint),
    ]) {
        Some(kind) => kind,
        None => FileKind::Other,
    }
}

/// OLE compound file: probe for the legacy stream names. The directory
/// usually sits early enough to fall inside the window; when it does not,
/// Word is the dominant legacy format and serves as the default.
fn classify_ole(window: &[u8]) -> FileKind {
    if find(window, OLE_WORKBOOK).is_some() {
        return FileKind::Excel;
    }
    if find(window, OLE_POWERPOINT).is_some() {
        return FileKind::Powerpoint;
    }
    FileKind::Word
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

fn earliest(candidates: &[(Option<usize>, FileKind)]) -> Option<FileKind> {
    candidates
        .iter()
        .filter_map(|(pos, kind)| pos.map(|p| (p, *kind)))
        .min_by_key(|(p, _)| *p)
        .map(|(_, kind)| kind)
}

//! PDF page text and document info

use chrono::NaiveDate;
use lopdf::{Dictionary, Document, Object};

use super::ExtractError;
use crate::types::MetadataScalar;

/// Info dictionary keys and the metadata names they map to.
/// Creator and Producer both report the generating software.
const INFO_FIELDS: &[(&[u8], &str)] = &[
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "producer"),
    (b"Producer", "producer"),
    (b"CreationDate", "creation_date"),
    (b"ModDate", "last_modification"),
];

fn load(contents: &[u8]) -> Result<Document, ExtractError> {
    Document::load_mem(contents).map_err(|e| ExtractError::unreadable("pdf", e))
}

/// Text of every page, one trailing newline per page.
pub fn extract_text(contents: &[u8]) -> Result<String, ExtractError> {
    let doc = load(contents)?;
    let mut text = String::new();
    for page in doc.get_pages().keys() {
        match doc.extract_text(&[*page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => tracing::debug!("No text extracted from PDF page {}: {}", page, e),
        }
        text.push('\n');
    }
    Ok(text)
}

/// Version, page count and info dictionary entries, in document order.
pub fn metadata(contents: &[u8]) -> Result<Vec<(&'static str, MetadataScalar)>, ExtractError> {
    let doc = load(contents)?;
    let mut fields = vec![
        ("pdf_version", MetadataScalar::from(doc.version.clone())),
        ("page_count", MetadataScalar::from(doc.get_pages().len() as i64)),
    ];

    let Some(info) = info_dictionary(&doc) else {
        return Ok(fields);
    };

    for (key, name) in INFO_FIELDS {
        let Some(value) = info.get(key).ok().and_then(|obj| string_value(&doc, obj)) else {
            continue;
        };
        match *name {
            "keywords" => fields.extend(split_keywords(&value).map(|k| (*name, k.into()))),
            "creation_date" | "last_modification" => fields.push((*name, parse_date(&value).into())),
            _ => fields.push((*name, value.into())),
        }
    }
    Ok(fields)
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn string_value(doc: &Document, obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            let text = decode_text_string(bytes);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Object::Reference(id) => string_value(doc, doc.get_object(*id).ok()?),
        _ => None,
    }
}

/// UTF-16BE when BOM-prefixed, otherwise treated as single-byte text.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

pub(crate) fn split_keywords(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// `D:YYYYMMDDHHmmSS...` to ISO 8601; anything else is kept verbatim.
fn parse_date(value: &str) -> String {
    let raw = value.strip_prefix("D:").unwrap_or(value);
    let field = |range: std::ops::Range<usize>| -> Option<u32> { raw.get(range)?.parse().ok() };
    let parsed = (|| {
        let date = NaiveDate::from_ymd_opt(field(0..4)? as i32, field(4..6)?, field(6..8)?)?;
        date.and_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)
    })();
    parsed
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| value.to_string())
}

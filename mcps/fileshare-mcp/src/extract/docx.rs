//! DOCX body text and core properties
//!
//! A DOCX file is a ZIP container; the body lives in `word/document.xml` and
//! the document properties in `docProps/core.xml`.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::pdf::split_keywords;
use super::ExtractError;
use crate::types::MetadataScalar;

const DOCUMENT_XML: &str = "word/document.xml";
const CORE_XML: &str = "docProps/core.xml";

/// Non-empty paragraphs and table cells in document order, newline-joined.
/// `max_entry_size` bounds the uncompressed body (`0` = no limit).
pub fn extract_text(contents: &[u8], max_entry_size: u64) -> Result<String, ExtractError> {
    let mut archive =
        ZipArchive::new(Cursor::new(contents)).map_err(|e| ExtractError::unreadable("docx", e))?;
    let xml = read_entry(&mut archive, DOCUMENT_XML, max_entry_size)?
        .ok_or_else(|| ExtractError::unreadable("docx", format!("missing {DOCUMENT_XML}")))?;
    Ok(body_blocks(&xml)?.join("\n"))
}

/// Read one archive member as UTF-8, `None` when it is absent.
///
/// At most `limit` uncompressed bytes are materialized (`0` = no limit). The
/// declared size is checked first, then the stream itself is capped since
/// the header can lie.
pub fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    limit: u64,
) -> Result<Option<String>, ExtractError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ExtractError::unreadable("zip", e)),
    };
    let too_large = |size: u64| ExtractError::TooLarge {
        name: name.to_string(),
        limit,
        size,
    };

    if limit != 0 && file.size() > limit {
        return Err(too_large(file.size()));
    }
    let cap = if limit == 0 { u64::MAX } else { limit + 1 };
    let mut bytes = Vec::new();
    (&mut file).take(cap).read_to_end(&mut bytes)?;
    if limit != 0 && bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }

    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| ExtractError::unreadable("zip", e))
}

/// Walk `word/document.xml`. Paragraphs inside a table cell are folded
/// into that cell; nested tables belong to the outer cell.
fn body_blocks(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut blocks = Vec::new();
    let mut paragraph = String::new();
    let mut cell: Vec<String> = Vec::new();
    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut in_tab_stops = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tc" if table_depth == 1 => cell.clear(),
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                b"tabs" => in_tab_stops = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"tc" if table_depth == 1 => {
                    let text = cell.join("\n");
                    if !text.trim().is_empty() {
                        blocks.push(text);
                    }
                }
                b"p" if table_depth == 0 => {
                    if !paragraph.trim().is_empty() {
                        blocks.push(std::mem::take(&mut paragraph));
                    }
                }
                b"p" => cell.push(std::mem::take(&mut paragraph)),
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::unreadable("docx", e))?;
                paragraph.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::unreadable("docx", e)),
            _ => {}
        }
    }

    Ok(blocks)
}

/// Map `docProps/core.xml` elements to metadata names.
fn core_property_name(local: &[u8]) -> Option<&'static str> {
    Some(match local {
        b"title" => "title",
        b"subject" => "subject",
        b"creator" => "author",
        b"keywords" => "keywords",
        b"description" => "comment",
        b"lastModifiedBy" => "last_modified_by",
        b"revision" => "revision",
        b"created" => "creation_date",
        b"modified" => "last_modification",
        b"category" => "category",
        b"language" => "language",
        _ => return None,
    })
}

/// Document properties from an OOXML container, in document order.
pub fn core_properties<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    max_entry_size: u64,
) -> Result<Vec<(&'static str, MetadataScalar)>, ExtractError> {
    let Some(xml) = read_entry(archive, CORE_XML, max_entry_size)? else {
        return Ok(Vec::new());
    };

    let mut reader = Reader::from_str(&xml);
    let mut fields = Vec::new();
    let mut current: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => current = core_property_name(e.local_name().as_ref()),
            Ok(Event::End(_)) => current = None,
            Ok(Event::Text(t)) => {
                let Some(name) = current else { continue };
                let text = t.unescape().map_err(|e| ExtractError::unreadable("docx", e))?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if name == "keywords" {
                    fields.extend(split_keywords(text).map(|k| (name, k.into())));
                } else {
                    fields.push((name, text.to_string().into()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::unreadable("docx", e)),
            _ => {}
        }
    }

    Ok(fields)
}

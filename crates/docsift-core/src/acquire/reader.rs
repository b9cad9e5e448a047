use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::document::DocumentFormat;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(DocumentFormat),
    #[error("Archive error: {0}")]
    Archive(String),
    #[error("Missing document part: {0}")]
    MissingPart(String),
    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type ReadResult<T> = Result<T, ReadError>;

/// Structural reader for formats whose text lives in the container itself.
///
/// Readers return best-effort text: a broken slide, sheet or paragraph is
/// skipped, only a container that cannot be opened at all is an error.
pub trait TextReader: Send + Sync {
    fn supported_formats(&self) -> &[DocumentFormat];

    fn can_read(&self, format: DocumentFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    fn read_bytes(&self, data: &[u8], format: DocumentFormat) -> ReadResult<String>;
}

pub struct PlainTextReader;

impl TextReader for PlainTextReader {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::PlainText]
    }

    fn read_bytes(&self, data: &[u8], _format: DocumentFormat) -> ReadResult<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

/// Flattens every scalar of a JSON document into `key: value` lines in
/// document order. Invalid JSON degrades to the raw text.
pub struct JsonReader;

impl TextReader for JsonReader {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Json]
    }

    fn read_bytes(&self, data: &[u8], _format: DocumentFormat) -> ReadResult<String> {
        match serde_json::from_slice::<serde_json::Value>(data) {
            Ok(value) => {
                let mut lines = Vec::new();
                flatten_json(None, &value, &mut lines);
                Ok(lines.join("\n"))
            }
            Err(e) => {
                tracing::warn!("JSON did not parse, reading as text: {e}");
                Ok(String::from_utf8_lossy(data).into_owned())
            }
        }
    }
}

fn flatten_json(key: Option<&str>, value: &serde_json::Value, lines: &mut Vec<String>) {
    use serde_json::Value;

    let scalar = match value {
        Value::Null => return,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            for item in items {
                flatten_json(key, item, lines);
            }
            return;
        }
        Value::Object(map) => {
            for (k, v) in map {
                flatten_json(Some(k.as_str()), v, lines);
            }
            return;
        }
    };

    match key {
        Some(k) => lines.push(format!("{k}: {scalar}")),
        None => lines.push(scalar),
    }
}

/// Reads the OOXML containers: paragraphs of a .docx, shapes of every
/// .pptx slide, cells of every .xlsx sheet.
pub struct OfficeReader;

impl TextReader for OfficeReader {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Docx, DocumentFormat::Pptx, DocumentFormat::Xlsx]
    }

    fn read_bytes(&self, data: &[u8], format: DocumentFormat) -> ReadResult<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| ReadError::Archive(e.to_string()))?;

        match format {
            DocumentFormat::Docx => read_docx(&mut archive),
            DocumentFormat::Pptx => read_pptx(&mut archive),
            DocumentFormat::Xlsx => read_xlsx(&mut archive),
            other => Err(ReadError::UnsupportedFormat(other)),
        }
    }
}

type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

fn read_part(archive: &mut Archive<'_>, name: &str) -> ReadResult<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| ReadError::MissingPart(name.to_string()))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| ReadError::Archive(format!("{name}: {e}")))?;
    Ok(xml)
}

/// Part names under `prefix` ordered by their trailing number
/// (`slide2.xml` before `slide10.xml`).
fn numbered_parts(archive: &Archive<'_>, prefix: &str) -> Vec<String> {
    let mut parts: Vec<(u32, String)> = archive
        .file_names()
        .filter(|n| n.starts_with(prefix) && n.ends_with(".xml"))
        .filter_map(|n| {
            let digits: String = n[prefix.len()..n.len() - 4]
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            digits.parse().ok().map(|num| (num, n.to_string()))
        })
        .collect();
    parts.sort();
    parts.into_iter().map(|(_, n)| n).collect()
}

fn read_docx(archive: &mut Archive<'_>) -> ReadResult<String> {
    let xml = read_part(archive, "word/document.xml")?;
    Ok(collect_runs("word/document.xml", &xml, b"t", b"p"))
}

fn read_pptx(archive: &mut Archive<'_>) -> ReadResult<String> {
    let slides = numbered_parts(archive, "ppt/slides/slide");
    let mut texts = Vec::with_capacity(slides.len());

    for slide in slides {
        match read_part(archive, &slide) {
            Ok(xml) => texts.push(collect_runs(&slide, &xml, b"t", b"p")),
            Err(e) => tracing::warn!("Skipping slide: {e}"),
        }
    }

    Ok(texts.join("\n"))
}

fn read_xlsx(archive: &mut Archive<'_>) -> ReadResult<String> {
    let shared = match read_part(archive, "xl/sharedStrings.xml") {
        Ok(xml) => shared_strings(&xml),
        Err(_) => Vec::new(),
    };

    let sheets = numbered_parts(archive, "xl/worksheets/sheet");
    let mut texts = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        match read_part(archive, &sheet) {
            Ok(xml) => texts.push(sheet_cells(&sheet, &xml, &shared)),
            Err(e) => tracing::warn!("Skipping sheet: {e}"),
        }
    }

    Ok(texts.join("\n"))
}

/// Concatenates the text of every `text_tag` element, ending a line at each
/// closing `block_tag`. A malformed part keeps whatever was read before the
/// error.
fn collect_runs(part: &str, xml: &str, text_tag: &[u8], block_tag: &[u8]) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == text_tag => in_text = true,
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == text_tag {
                    in_text = false;
                } else if name.as_ref() == block_tag {
                    out.push('\n');
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => match t.unescape() {
                Ok(s) => out.push_str(&s),
                Err(e) => warn_xml(part, &e),
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn_xml(part, &e);
                break;
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                if let Ok(s) = t.unescape() {
                    current.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn_xml("xl/sharedStrings.xml", &e);
                break;
            }
            _ => {}
        }
    }

    strings
}

fn sheet_cells(part: &str, xml: &str, shared: &[String]) -> String {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell_type: Option<String> = None;
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"c" => {
                    cell_type = e
                        .try_get_attribute("t")
                        .ok()
                        .flatten()
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                    value.clear();
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    let text = resolve_cell(cell_type.as_deref(), &value, shared);
                    if !text.is_empty() {
                        row.push(text);
                    }
                }
                b"row" => {
                    if !row.is_empty() {
                        rows.push(row.join("\t"));
                    }
                    row.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                if let Ok(s) = t.unescape() {
                    value.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn_xml(part, &e);
                break;
            }
            _ => {}
        }
    }

    if !row.is_empty() {
        rows.push(row.join("\t"));
    }

    rows.join("\n")
}

fn resolve_cell(cell_type: Option<&str>, value: &str, shared: &[String]) -> String {
    if cell_type == Some("s") {
        value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .cloned()
            .unwrap_or_default()
    } else {
        value.to_string()
    }
}

fn warn_xml(part: &str, error: &quick_xml::Error) {
    tracing::warn!(part, "Stopped reading malformed XML: {error}");
}

pub struct CompositeReader {
    readers: Vec<Box<dyn TextReader>>,
}

impl CompositeReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_reader(mut self, reader: Box<dyn TextReader>) -> Self {
        self.readers.push(reader);
        self
    }

    fn find_reader(&self, format: DocumentFormat) -> Option<&dyn TextReader> {
        self.readers
            .iter()
            .find(|r| r.can_read(format))
            .map(AsRef::as_ref)
    }
}

impl Default for CompositeReader {
    fn default() -> Self {
        Self::new()
            .with_reader(Box::new(PlainTextReader))
            .with_reader(Box::new(JsonReader))
            .with_reader(Box::new(OfficeReader))
    }
}

impl TextReader for CompositeReader {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[
            DocumentFormat::PlainText,
            DocumentFormat::Json,
            DocumentFormat::Docx,
            DocumentFormat::Pptx,
            DocumentFormat::Xlsx,
        ]
    }

    fn can_read(&self, format: DocumentFormat) -> bool {
        self.find_reader(format).is_some()
    }

    fn read_bytes(&self, data: &[u8], format: DocumentFormat) -> ReadResult<String> {
        let reader = self
            .find_reader(format)
            .ok_or(ReadError::UnsupportedFormat(format))?;

        reader.read_bytes(data, format)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn make_zip(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            for (name, body) in parts {
                writer
                    .start_file(*name, zip::write::FileOptions::default())
                    .unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    pub(crate) fn make_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        make_zip(&[("word/document.xml", &xml)])
    }

    #[test]
    fn test_plain_text_reader_is_lossy() {
        let text = PlainTextReader
            .read_bytes(b"rent \xff due", DocumentFormat::PlainText)
            .unwrap();
        assert!(text.starts_with("rent "));
        assert!(text.ends_with(" due"));
    }

    #[test]
    fn test_json_reader_flattens_in_order() {
        let data = br#"{"tenant": "Jane", "contact": {"email": "jane@example.com"}, "rooms": [1, 2]}"#;
        let text = JsonReader.read_bytes(data, DocumentFormat::Json).unwrap();
        assert_eq!(
            text,
            "tenant: Jane\nemail: jane@example.com\nrooms: 1\nrooms: 2"
        );
    }

    #[test]
    fn test_json_reader_falls_back_to_text() {
        let text = JsonReader
            .read_bytes(b"{not json", DocumentFormat::Json)
            .unwrap();
        assert_eq!(text, "{not json");
    }

    #[test]
    fn test_docx_paragraphs() {
        let data = make_docx(&["Lease between A and B", "Monthly rental R 5,000"]);
        let text = OfficeReader.read_bytes(&data, DocumentFormat::Docx).unwrap();
        assert_eq!(text, "Lease between A and B\nMonthly rental R 5,000");
    }

    #[test]
    fn test_docx_unescapes_entities() {
        let data = make_docx(&["Smith &amp; Sons"]);
        let text = OfficeReader.read_bytes(&data, DocumentFormat::Docx).unwrap();
        assert_eq!(text, "Smith & Sons");
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let slide = |t: &str| format!("<p:sld><p:txBody><a:p><a:r><a:t>{t}</a:t></a:r></a:p></p:txBody></p:sld>");
        let s1 = slide("first");
        let s2 = slide("second");
        let s10 = slide("tenth");
        let data = make_zip(&[
            ("ppt/slides/slide10.xml", &s10),
            ("ppt/slides/slide2.xml", &s2),
            ("ppt/slides/slide1.xml", &s1),
        ]);
        let text = OfficeReader.read_bytes(&data, DocumentFormat::Pptx).unwrap();
        assert_eq!(text, "first\nsecond\ntenth");
    }

    #[test]
    fn test_xlsx_shared_and_inline_cells() {
        let shared = r#"<sst><si><t>Email</t></si><si><t>a@b.co.za</t></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
            <row><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row><c r="A2" t="inlineStr"><is><t>ID</t></is></c><c r="B2"><v>8801015800085</v></c></row>
        </sheetData></worksheet>"#;
        let data = make_zip(&[
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet1.xml", sheet),
        ]);
        let text = OfficeReader.read_bytes(&data, DocumentFormat::Xlsx).unwrap();
        assert_eq!(text, "Email\ta@b.co.za\nID\t8801015800085");
    }

    #[test]
    fn test_malformed_part_keeps_partial_text() {
        let xml = "<w:document><w:p><w:t>kept</w:t></w:p><w:p><w:t>broken</w:x></w:p>";
        let text = collect_runs("word/document.xml", xml, b"t", b"p");
        assert!(text.starts_with("kept"));
    }

    #[test]
    fn test_corrupt_archive_is_error() {
        let result = OfficeReader.read_bytes(b"definitely not a zip", DocumentFormat::Docx);
        assert!(matches!(result, Err(ReadError::Archive(_))));
    }

    #[test]
    fn test_composite_rejects_pdf() {
        let reader = CompositeReader::default();
        assert!(!reader.can_read(DocumentFormat::Pdf));
        assert!(reader.can_read(DocumentFormat::Xlsx));
    }
}

//! Document assembly: render sorted translated chapters to DOCX or PDF.
//!
//! Deterministic given sorted input. The DOCX path writes a minimal OOXML
//! package (content types, package relationships, `word/document.xml`) into
//! a zip container. The PDF path emits a plain Helvetica/WinAnsi document,
//! one or more pages per chapter — sufficient for Latin-script target
//! languages; scripts outside WinAnsi need the DOCX output.
//!
//! Output files are written atomically (temp file + rename) so a polling
//! caller never sees a partial document at the result path.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::chapter::TranslatedChapter;
use crate::config::OutputFormat;
use crate::error::TranslateError;

/// Render `chapters` to `format` and write the file to
/// `<output_dir>/<job_id>.<ext>`.
pub async fn assemble_document(
    chapters: &[TranslatedChapter],
    format: OutputFormat,
    output_dir: &Path,
    job_id: Uuid,
) -> Result<PathBuf, TranslateError> {
    let bytes = match format {
        OutputFormat::Docx => build_docx(chapters)?,
        OutputFormat::Pdf => build_pdf(chapters),
    };

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| TranslateError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let path = output_dir.join(format!("{job_id}.{}", format.extension()));
    let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));

    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| TranslateError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| TranslateError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!(path = %path.display(), size = bytes.len(), "assembled {format} document");
    Ok(path)
}

// ── DOCX ─────────────────────────────────────────────────────────────────

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const WORDPROCESSINGML_NS: &str =
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Build a complete DOCX package in memory.
fn build_docx(chapters: &[TranslatedChapter]) -> Result<Vec<u8>, TranslateError> {
    let document = build_document_xml(chapters).map_err(|e| TranslateError::AssemblyFailed {
        format: OutputFormat::Docx,
        detail: format!("document.xml: {e}"),
    })?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 3] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("word/document.xml", &document),
    ];
    for (name, data) in parts {
        zip.start_file(name, opts)
            .and_then(|()| zip.write_all(data).map_err(Into::into))
            .map_err(|e| TranslateError::AssemblyFailed {
                format: OutputFormat::Docx,
                detail: format!("{name}: {e}"),
            })?;
    }

    let cursor = zip.finish().map_err(|e| TranslateError::AssemblyFailed {
        format: OutputFormat::Docx,
        detail: e.to_string(),
    })?;
    Ok(cursor.into_inner())
}

/// Build `word/document.xml`: a bold heading per chapter, then one
/// paragraph per source line (blank lines become empty paragraphs).
fn build_document_xml(chapters: &[TranslatedChapter]) -> std::io::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORDPROCESSINGML_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for chapter in chapters {
        write_heading(&mut writer, &format!("Chapter {}", chapter.id))?;
        for line in chapter.content.lines() {
            write_paragraph(&mut writer, line)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}

fn write_heading(writer: &mut Writer<Vec<u8>>, text: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
    writer.write_event(Event::Empty(BytesStart::new("w:b")))?;
    writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    write_text_run(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_paragraph(writer: &mut Writer<Vec<u8>>, line: &str) -> std::io::Result<()> {
    if line.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    write_text_run(writer, line)?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_text_run(writer: &mut Writer<Vec<u8>>, text: &str) -> std::io::Result<()> {
    let mut t = BytesStart::new("w:t");
    t.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    Ok(())
}

// ── PDF ──────────────────────────────────────────────────────────────────

// US Letter, 1-inch margins, 12 pt Helvetica with 14 pt leading.
const PDF_TOP_Y: f32 = 756.0;
const PDF_LEFT_X: f32 = 72.0;
const PDF_LINES_PER_PAGE: usize = 48;
const PDF_WRAP_COLS: usize = 90;

/// Build a complete PDF document in memory. Each chapter starts on a fresh
/// page; long chapters flow onto further pages.
fn build_pdf(chapters: &[TranslatedChapter]) -> Vec<u8> {
    // Lay out all text into pages of at most PDF_LINES_PER_PAGE lines.
    let mut pages: Vec<Vec<String>> = Vec::new();
    for chapter in chapters {
        let mut lines = vec![format!("Chapter {}", chapter.id), String::new()];
        for source_line in chapter.content.lines() {
            lines.extend(wrap_line(source_line, PDF_WRAP_COLS));
        }
        for page_lines in lines.chunks(PDF_LINES_PER_PAGE) {
            pages.push(page_lines.to_vec());
        }
    }

    // Object layout: 1 catalog, 2 page tree, 3 font, then for page k
    // (0-based) a content stream at 4+2k and a page at 5+2k.
    let page_count = pages.len();
    let mut objects: Vec<Vec<u8>> = Vec::new();

    let kids: Vec<String> = (0..page_count).map(|k| format!("{} 0 R", 5 + 2 * k)).collect();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    for (k, page_lines) in pages.iter().enumerate() {
        let stream = build_content_stream(page_lines);
        let mut content = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        content.extend_from_slice(&stream);
        content.extend_from_slice(b"\nendstream");
        objects.push(content);

        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                4 + 2 * k
            )
            .into_bytes(),
        );
    }

    // Serialise objects, recording byte offsets for the xref table.
    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// Text-drawing operators for one page.
fn build_content_stream(lines: &[String]) -> Vec<u8> {
    let mut stream = format!("BT\n/F1 12 Tf\n14 TL\n{PDF_LEFT_X} {PDF_TOP_Y} Td\n").into_bytes();
    for line in lines {
        stream.push(b'(');
        stream.extend_from_slice(&escape_pdf_string(line));
        stream.extend_from_slice(b") Tj\nT*\n");
    }
    stream.extend_from_slice(b"ET\n");
    stream
}

/// Escape a line for a PDF literal string, encoding to WinAnsi.
///
/// WinAnsi matches Latin-1 except in 0x80–0x9F, where it places CP-1252
/// punctuation instead of C1 controls; the common punctuation code points
/// are mapped onto those slots and everything else unrepresentable becomes
/// `?`.
fn escape_pdf_string(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{2018}' => out.push(0x91),
            '\u{2019}' => out.push(0x92),
            '\u{201C}' => out.push(0x93),
            '\u{201D}' => out.push(0x94),
            '\u{2013}' => out.push(0x96),
            '\u{2014}' => out.push(0x97),
            '\u{2026}' => out.push(0x85),
            '\u{0080}'..='\u{009F}' => out.push(b'?'),
            c if (c as u32) < 0x100 => out.push(c as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Hard-wrap a line at `cols` characters.
fn wrap_line(line: &str, cols: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    crate::pipeline::chunk::split_text(line, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chapters() -> Vec<TranslatedChapter> {
        vec![
            TranslatedChapter {
                id: 1,
                content: "Primeira linha.\n\nSegunda linha com <tags> & \"aspas\".".into(),
            },
            TranslatedChapter {
                id: 2,
                content: "Capítulo dois.".into(),
            },
        ]
    }

    #[test]
    fn docx_is_a_zip_package() {
        let bytes = build_docx(&sample_chapters()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn document_xml_escapes_markup() {
        let xml = build_document_xml(&sample_chapters()).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("Chapter 1"));
        assert!(xml.contains("&lt;tags&gt;"));
        assert!(!xml.contains("<tags>"));
        assert!(xml.contains("Primeira linha."));
    }

    #[test]
    fn pdf_has_header_and_trailer() {
        let bytes = build_pdf(&sample_chapters());
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn pdf_escaping() {
        assert_eq!(escape_pdf_string("a(b)c\\d"), b"a\\(b\\)c\\\\d".to_vec());
        // Outside WinAnsi → replacement.
        assert_eq!(escape_pdf_string("你"), b"?".to_vec());
    }

    #[test]
    fn pdf_escaping_maps_cp1252_punctuation() {
        assert_eq!(
            escape_pdf_string("\u{201C}ok\u{201D} \u{2014} fim\u{2026}"),
            vec![0x93, b'o', b'k', 0x94, b' ', 0x97, b' ', b'f', b'i', b'm', 0x85]
        );
        // C1 controls have different glyphs in WinAnsi; never pass them raw.
        assert_eq!(escape_pdf_string("a\u{0085}b"), b"a?b".to_vec());
        // 0xA0–0xFF matches Latin-1 and passes through.
        assert_eq!(escape_pdf_string("café"), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn long_chapters_flow_onto_multiple_pages() {
        let content = vec!["linha"; PDF_LINES_PER_PAGE * 2].join("\n");
        let bytes = build_pdf(&[TranslatedChapter { id: 1, content }]);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"), "two content pages plus overflow");
    }

    #[tokio::test]
    async fn assemble_writes_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let job_id = Uuid::new_v4();
        let path = assemble_document(
            &sample_chapters(),
            OutputFormat::Docx,
            dir.path(),
            job_id,
        )
        .await
        .unwrap();
        assert_eq!(path, dir.path().join(format!("{job_id}.docx")));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}

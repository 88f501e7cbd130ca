//! DOCX paragraph text extraction using zip and quick-xml.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::DirectText;
use crate::error::ReadError;

/// Reads the paragraphs of `word/document.xml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxReader;

impl DocxReader {
    pub fn new() -> Self {
        Self
    }

    /// Extract non-blank paragraphs joined with newlines.
    pub fn read(&self, data: &[u8]) -> Result<DirectText, ReadError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| ReadError::Docx(format!("not a DOCX archive: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| ReadError::Docx(format!("cannot find word/document.xml: {}", e)))?
            .read_to_string(&mut xml)
            .map_err(|e| ReadError::Docx(e.to_string()))?;

        let paragraphs = parse_paragraphs(&xml)?;
        debug!("DOCX has {} non-blank paragraphs", paragraphs.len());

        Ok(DirectText::from_text(&paragraphs.join("\n")))
    }
}

/// Collect paragraph texts in the order their `w:p` elements close.
///
/// Paragraphs nested in text boxes are emitted on their own without
/// disturbing the enclosing paragraph. Tabs and breaks count only inside
/// runs, so tab-stop definitions in `w:pPr` are ignored.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ReadError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if run_depth > 0 => {
                if let Some(current) = open.last_mut() {
                    match e.name().as_ref() {
                        b"w:tab" => current.push('\t'),
                        b"w:br" | b"w:cr" => current.push('\n'),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:p" => {
                    if let Some(para) = open.pop() {
                        let para = para.trim();
                        if !para.is_empty() {
                            paragraphs.push(para.to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| ReadError::Docx(e.to_string()))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ReadError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>北京市海淀区人民法院</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">   </w:t></w:r></w:p>
    <w:p><w:r><w:t>民事判决书</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>（2023）京0108民初</w:t></w:r><w:r><w:t>12345号</w:t></w:r></w:p>
    <w:p><w:r><w:t>原告：张三</w:t><w:tab/><w:t>被告：李四 &amp; 王五</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_read_paragraphs() {
        let data = build_docx(DOCUMENT);
        let text = DocxReader::new().read(&data).unwrap();

        assert_eq!(
            text,
            DirectText::Content(
                "北京市海淀区人民法院\n民事判决书\n（2023）京0108民初12345号\n原告：张三\t被告：李四 & 王五"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_text_box_and_tab_stops() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>审判长</w:t></w:r><w:r><w:tab/><w:t>王某</w:t></w:r></w:p>
<w:p><w:r><w:t>本院认为，</w:t></w:r><w:r><w:pict><w:txbxContent><w:p><w:r><w:t>附注</w:t></w:r></w:p></w:txbxContent></w:pict></w:r><w:r><w:t>原告诉请成立。</w:t></w:r></w:p>
</w:body></w:document>"#;

        let paragraphs = parse_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["审判长\t王某", "附注", "本院认为，原告诉请成立。"]);
    }

    #[test]
    fn test_empty_document() {
        let data = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#,
        );
        assert_eq!(DocxReader::new().read(&data).unwrap(), DirectText::Empty);
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxReader::new().read(b"plain text").unwrap_err();
        assert!(matches!(err, ReadError::Docx(_)));
    }
}

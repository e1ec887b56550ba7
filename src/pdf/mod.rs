//! # PDF Serializer
//!
//! Takes the buffered pages from the canvas and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Reports only ever use the standard
//! Type1 fonts, so nothing is embedded: each font is a four-key dictionary
//! with WinAnsiEncoding, and every page is one compressed content stream.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Canvas coordinates grow downward from the page top; PDF user space grows
//! upward from the bottom. Every y is flipped on the way out.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{DrawOp, Page, Rect, TextLine};
use crate::error::DossierError;
use crate::font::{FontContext, StandardFont};
use crate::style::{Color, FontFace, PageGeometry, Stroke, TextStyle};

const PRODUCER: &str = "Dossier 0.1";

/// Document-level metadata for the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter<'a> {
    geometry: &'a PageGeometry,
    font_context: &'a FontContext,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font resource `/F{i}` is `fonts[i]`, stored at object `font_ids[i]`.
    fonts: Vec<StandardFont>,
    font_ids: Vec<usize>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.fonts.iter().position(|f| *f == font).unwrap_or(0)
    }
}

impl<'a> PdfWriter<'a> {
    pub fn new(geometry: &'a PageGeometry, font_context: &'a FontContext) -> Self {
        Self {
            geometry,
            font_context,
        }
    }

    /// Write the pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], info: &DocumentInfo) -> Result<Vec<u8>, DossierError> {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            fonts: Vec::new(),
            font_ids: Vec::new(),
        };

        self.register_fonts(&mut builder, pages);
        let font_resources = build_font_resource_dict(&builder.font_ids);

        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data: Vec<u8> = Vec::new();
            write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )?;
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                self.geometry.width(),
                self.geometry.height(),
                content_obj_id,
                font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut dict = String::from("<< ");
        if let Some(ref title) = info.title {
            let _ = write!(dict, "/Title {} ", text_string(title));
        }
        if let Some(ref author) = info.author {
            let _ = write!(dict, "/Author {} ", text_string(author));
        }
        if let Some(ref subject) = info.subject {
            let _ = write!(dict, "/Subject {} ", text_string(subject));
        }
        let _ = write!(dict, "/Producer ({}) >>", PRODUCER);
        let info_obj_id = builder.push(dict.into_bytes());

        serialize(&builder, info_obj_id)
    }

    /// Write the PDF straight to `out`.
    pub fn write_to<W: IoWrite>(
        &self,
        pages: &[Page],
        info: &DocumentInfo,
        out: &mut W,
    ) -> Result<usize, DossierError> {
        let bytes = self.write(pages, info)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(bytes.len())
    }

    /// Register every font used on any page, in a fixed order, each as its
    /// own Type1 font object.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        let mut used: BTreeSet<StandardFont> = BTreeSet::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { style, .. } = op {
                    used.insert(self.font_context.resolve(style.face));
                }
            }
        }
        // A page tree with no font resources at all trips up some readers.
        if used.is_empty() {
            used.insert(self.font_context.resolve(FontFace::Regular));
        }

        for font in used {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(font_dict.into_bytes());
            builder.fonts.push(font);
            builder.font_ids.push(id);
        }
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &Page, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for op in &page.ops {
            match op {
                DrawOp::Rect { rect, fill, stroke } => self.write_rect(&mut stream, rect, *fill, *stroke),
                DrawOp::Line { from, to, stroke } => {
                    let h = self.geometry.height();
                    write_stroke_color(&mut stream, stroke);
                    let _ = write!(
                        stream,
                        "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        from.x,
                        h - from.y,
                        to.x,
                        h - to.y
                    );
                }
                DrawOp::Text { style, lines } => self.write_text(&mut stream, style, lines, builder),
            }
        }
        stream
    }

    fn write_rect(&self, stream: &mut String, rect: &Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        let y = self.geometry.height() - rect.y - rect.height;
        if let Some(bg) = fill {
            let _ = write!(
                stream,
                "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                bg.r, bg.g, bg.b, rect.x, y, rect.width, rect.height
            );
        }
        if let Some(stroke) = stroke {
            write_stroke_color(stream, &stroke);
            let _ = write!(
                stream,
                "{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                rect.x, y, rect.width, rect.height
            );
        }
    }

    fn write_text(&self, stream: &mut String, style: &TextStyle, lines: &[TextLine], builder: &PdfBuilder) {
        let font = self.font_context.resolve(style.face);
        let font_index = builder.font_index(font);
        let ascent = self.font_context.ascent(style.face, style.size);
        let page_height = self.geometry.height();

        let _ = write!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n",
            style.color.r, style.color.g, style.color.b, font_index, style.size
        );
        for line in lines {
            // Line boxes are positioned by their top; PDF places the baseline.
            let baseline = page_height - (line.y + ascent);
            let _ = write!(
                stream,
                "1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                line.x,
                baseline,
                encode_winansi(&line.text)
            );
        }
        stream.push_str("ET\n");
    }
}

fn write_stroke_color(stream: &mut String, stroke: &Stroke) {
    let _ = write!(
        stream,
        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n",
        stroke.color.r, stroke.color.g, stroke.color.b, stroke.width
    );
}

fn build_font_resource_dict(font_ids: &[usize]) -> String {
    font_ids
        .iter()
        .enumerate()
        .map(|(i, obj_id)| format!("/F{} {} 0 R", i, obj_id))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// A text string for the Info dictionary: a literal when plain ASCII,
/// otherwise UTF-16BE hex with a byte-order mark.
fn text_string(s: &str) -> String {
    if s.is_ascii() {
        return format!("({})", escape_pdf_string(s));
    }
    let mut hex = String::from("<FEFF");
    for unit in s.encode_utf16() {
        let _ = write!(hex, "{:04X}", unit);
    }
    hex.push('>');
    hex
}

/// Encode text for a `Tj` operand under WinAnsiEncoding. Characters the
/// encoding lacks become `?`.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// holds smart quotes, bullets, dashes and the ellipsis.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Result<Vec<u8>, DossierError> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, data) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        write!(output, "{} 0 obj\n", i)?;
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    write!(output, "xref\n0 {}\n", builder.objects.len())?;
    write!(output, "0000000000 65535 f \n")?;
    for offset in offsets.iter().skip(1) {
        write!(output, "{:010} 00000 n \n", offset)?;
    }

    write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        builder.objects.len(),
        info_obj_id,
        xref_offset
    )?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DocumentCanvas, LayoutCursor, PageCanvas, Point};
    use crate::style::FontFamily;

    fn contains(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    fn write(canvas: &PageCanvas, info: &DocumentInfo) -> Vec<u8> {
        PdfWriter::new(canvas.geometry(), canvas.font_context())
            .write(canvas.pages(), info)
            .unwrap()
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(encode_winansi("Task 1: A\u{2014}B"), "Task 1: A\\227B");
        assert_eq!(encode_winansi("cut\u{2026}"), "cut\\205");
        assert_eq!(encode_winansi("\u{4e2d}"), "?");
    }

    #[test]
    fn test_non_ascii_title_uses_utf16() {
        assert_eq!(text_string("Plain"), "(Plain)");
        assert_eq!(text_string("A\u{2014}B"), "<FEFF004120140042>");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let canvas = PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Helvetica));
        let bytes = write(&canvas, &DocumentInfo::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let canvas = PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Helvetica));
        let info = DocumentInfo {
            title: Some("CWP-904 Audit".to_string()),
            author: Some("Compliance".to_string()),
            subject: None,
        };
        let text = String::from_utf8_lossy(&write(&canvas, &info)).into_owned();
        assert!(text.contains("/Title (CWP-904 Audit)"));
        assert!(text.contains("/Author (Compliance)"));
        assert!(text.contains("/Producer (Dossier 0.1)"));
    }

    #[test]
    fn test_only_used_fonts_are_registered() {
        let mut canvas = PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Courier));
        let mut cursor = LayoutCursor::start(canvas.geometry());
        canvas
            .draw_text("plain", 30.0, 40.0, 200.0, &TextStyle::new(FontFace::Regular, 8.0, Color::BLACK))
            .unwrap();
        canvas.add_page(&mut cursor);
        canvas
            .draw_text("bold", 30.0, 40.0, 200.0, &TextStyle::new(FontFace::Bold, 8.0, Color::BLACK))
            .unwrap();
        let text = String::from_utf8_lossy(&write(&canvas, &DocumentInfo::default())).into_owned();
        assert!(text.contains("/BaseFont /Courier "));
        assert!(text.contains("/BaseFont /Courier-Bold "));
        assert!(!text.contains("Courier-Oblique"));
        assert!(!text.contains("Helvetica"));
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut canvas = PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Helvetica));
        canvas.draw_rect(Rect::new(30.0, 40.0, 100.0, 20.0), Some(Color::WHITE), None);
        canvas.draw_line(
            Point::new(30.0, 60.0),
            Point::new(130.0, 60.0),
            Stroke { color: Color::BLACK, width: 0.5 },
        );
        let info = DocumentInfo::default();
        assert_eq!(write(&canvas, &info), write(&canvas, &info));
    }

    #[test]
    fn test_write_to_reports_io_errors() {
        struct Broken;
        impl IoWrite for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let canvas = PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Helvetica));
        let err = PdfWriter::new(canvas.geometry(), canvas.font_context())
            .write_to(canvas.pages(), &DocumentInfo::default(), &mut Broken)
            .unwrap_err();
        assert!(matches!(err, DossierError::Stream(_)));
    }
}

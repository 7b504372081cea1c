//! Export of a formatted result as a text file, a paginated PDF, or a PNG
//! snapshot of the result panel.
//!
//! Every export is triggered by an explicit user action and is a no-op for
//! empty content. Nothing here retries or queues.

use crate::errors::ExportError;
use crate::format::DisplayFragment;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASENAME: &str = "wissen-kompaktor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }

    pub fn default_filename(self) -> String {
        format!("{}.{}", DEFAULT_BASENAME, self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "pdf" => Ok(ExportFormat::Pdf),
            "png" | "image" => Ok(ExportFormat::Png),
            _ => anyhow::bail!("Invalid export format '{}'. Valid values: txt, pdf, png", s),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let write_err = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, bytes).map_err(write_err)
}

/// Write `content` as UTF-8 text. Returns `None` without touching the disk
/// when there is nothing to export.
pub fn export_text(content: &str, path: &Path) -> Result<Option<PathBuf>, ExportError> {
    if content.is_empty() {
        return Ok(None);
    }
    write_file(path, content.as_bytes())?;
    tracing::info!(path = %path.display(), "Exported text");
    Ok(Some(path.to_path_buf()))
}

// Page geometry in millimetres (A4 portrait).
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LINE_WIDTH_MM: f32 = 190.0;
const LINE_HEIGHT_MM: f32 = 7.0;
/// Cursor position after which the next line starts a new page.
const PAGE_BREAK_MM: f32 = 280.0;

const FONT_SIZE_PT: f32 = 11.0;
/// Courier advances every glyph by 600/1000 em.
const CHAR_ADVANCE_EM: f32 = 0.6;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Characters that fit on one PDF line.
pub fn pdf_columns() -> usize {
    let advance_mm = FONT_SIZE_PT * CHAR_ADVANCE_EM / PT_PER_MM;
    (LINE_WIDTH_MM / advance_mm).floor() as usize
}

/// A laid-out PDF line: text plus its vertical cursor position in mm from
/// the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub y_mm: f32,
}

/// Wrap `content` to the page width and split it into pages.
pub fn paginate(content: &str) -> Vec<Vec<PdfLine>> {
    let columns = pdf_columns();
    let mut pages: Vec<Vec<PdfLine>> = vec![Vec::new()];
    let mut y = MARGIN_MM;

    let wrapped = content.lines().flat_map(|line| {
        if line.trim().is_empty() {
            vec![String::new()]
        } else {
            textwrap::wrap(line, columns)
                .into_iter()
                .map(|l| l.into_owned())
                .collect()
        }
    });

    for text in wrapped {
        if y > PAGE_BREAK_MM {
            pages.push(Vec::new());
            y = MARGIN_MM;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PdfLine { text, y_mm: y });
        }
        y += LINE_HEIGHT_MM;
    }
    pages
}

/// Encode for the WinAnsi-encoded base font; unsupported characters become `?`.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

fn mm_to_pt(mm: f32) -> i64 {
    (mm * PT_PER_MM).round() as i64
}

/// Build the PDF document bytes for `content`.
pub fn render_pdf(content: &str) -> Result<Vec<u8>, ExportError> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, StringFormat, dictionary};

    let pages = paginate(content);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let page_height_pt = mm_to_pt(PAGE_HEIGHT_MM);
    let x_pt = mm_to_pt(MARGIN_MM);
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in &pages {
        let mut operations = Vec::with_capacity(page.len() * 5);
        for line in page.iter().filter(|l| !l.text.is_empty()) {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), Object::Integer(FONT_SIZE_PT as i64)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![
                    Object::Integer(x_pt),
                    Object::Integer(page_height_pt - mm_to_pt(line.y_mm)),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi_bytes(&line.text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let encoded = Content { operations }
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(mm_to_pt(PAGE_WIDTH_MM)),
                Object::Integer(page_height_pt),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(bytes)
}

/// Write `content` as a paginated PDF. `None` when there is nothing to export.
pub fn export_pdf(content: &str, path: &Path) -> Result<Option<PathBuf>, ExportError> {
    if content.is_empty() {
        return Ok(None);
    }
    let bytes = render_pdf(content)?;
    write_file(path, &bytes)?;
    tracing::info!(path = %path.display(), "Exported PDF");
    Ok(Some(path.to_path_buf()))
}

/// A screen region that can be captured as an image.
pub trait Snapshot {
    fn title(&self) -> &str;
    fn lines(&self) -> Vec<String>;
}

/// The result panel as shown in the terminal.
#[derive(Debug, Clone)]
pub struct ResultPanel {
    pub title: String,
    pub fragment: DisplayFragment,
    pub width: usize,
}

impl Snapshot for ResultPanel {
    fn title(&self) -> &str {
        &self.title
    }

    fn lines(&self) -> Vec<String> {
        self.fragment.lines(self.width)
    }
}

const GLYPH: u32 = 8;
const SCALE: u32 = 2;
const CELL: u32 = GLYPH * SCALE;
const LINE_GAP: u32 = 4;
const PADDING: u32 = 24;
const MAX_COLUMNS: usize = 120;
const MAX_LINES: usize = 400;

const BACKGROUND: [u8; 3] = [15, 23, 42];
const FOREGROUND: [u8; 3] = [226, 232, 240];
const ACCENT: [u8; 3] = [196, 181, 253];

fn glyph(c: char) -> [u8; 8] {
    use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};

    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get(if c == '•' { '*' } else { '?' }))
        .unwrap_or([0; 8])
}

/// Rasterize a snapshot into an RGB image using an 8x8 bitmap font.
pub fn rasterize(region: &dyn Snapshot) -> Result<image::RgbImage, ExportError> {
    let mut rows: Vec<(String, [u8; 3])> = vec![
        (region.title().to_string(), ACCENT),
        (String::new(), FOREGROUND),
    ];
    let body = region.lines();
    if body.is_empty() {
        return Err(ExportError::Image("region has no content".to_string()));
    }
    rows.extend(body.into_iter().take(MAX_LINES).map(|l| (l, FOREGROUND)));

    let columns = rows
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, MAX_COLUMNS) as u32;
    let width = PADDING * 2 + columns * CELL;
    let height = PADDING * 2 + rows.len() as u32 * (CELL + LINE_GAP);

    let mut img = image::RgbImage::from_pixel(width, height, image::Rgb(BACKGROUND));
    for (row, (line, color)) in rows.iter().enumerate() {
        let top = PADDING + row as u32 * (CELL + LINE_GAP);
        for (col, c) in line.chars().take(MAX_COLUMNS).enumerate() {
            let left = PADDING + col as u32 * CELL;
            for (gy, bits) in glyph(c).iter().enumerate() {
                for gx in 0..GLYPH {
                    if bits & (1 << gx) == 0 {
                        continue;
                    }
                    for sy in 0..SCALE {
                        for sx in 0..SCALE {
                            img.put_pixel(
                                left + gx * SCALE + sx,
                                top + gy as u32 * SCALE + sy,
                                image::Rgb(*color),
                            );
                        }
                    }
                }
            }
        }
    }
    Ok(img)
}

/// Capture `region` as a PNG. Best-effort: failures are logged and yield `None`.
pub fn export_image(region: &dyn Snapshot, path: &Path) -> Option<PathBuf> {
    let result = rasterize(region).and_then(|img| {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ExportError::Image(e.to_string()))
    });

    match result {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Exported image");
            Some(path.to_path_buf())
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Image export failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_text_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let written = export_text("a\nb", &path).unwrap();
        assert_eq!(written, Some(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb");
    }

    #[test]
    fn test_empty_exports_are_noops() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("out.txt");
        let pdf = dir.path().join("out.pdf");
        assert_eq!(export_text("", &txt).unwrap(), None);
        assert_eq!(export_pdf("", &pdf).unwrap(), None);
        assert!(!txt.exists());
        assert!(!pdf.exists());
    }

    #[test]
    fn test_pdf_columns_fit_line_width() {
        let columns = pdf_columns();
        assert!(columns > 60 && columns < 100, "got {}", columns);
    }

    #[test]
    fn test_paginate_short_text_is_one_page() {
        let pages = paginate("Hello\nworld");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0][0].text, "Hello");
        assert_eq!(pages[0][0].y_mm, MARGIN_MM);
        assert_eq!(pages[0][1].y_mm, MARGIN_MM + LINE_HEIGHT_MM);
    }

    #[test]
    fn test_paginate_breaks_after_printable_height() {
        let content = (1..=100).map(|n| format!("line {}", n)).collect::<Vec<_>>().join("\n");
        let pages = paginate(&content);
        let per_page = pages[0].len();
        assert_eq!(per_page, 39);
        assert!(pages.len() >= 3);
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 100);
        for page in &pages {
            assert_eq!(page[0].y_mm, MARGIN_MM);
            assert!(page.iter().all(|l| l.y_mm <= PAGE_BREAK_MM + LINE_HEIGHT_MM));
        }
        assert_eq!(pages[1][0].text, "line 40");
    }

    #[test]
    fn test_paginate_wraps_long_lines() {
        let long = "wort ".repeat(100);
        let pages = paginate(&long);
        assert!(pages[0].len() > 1);
        assert!(pages[0].iter().all(|l| l.text.chars().count() <= pdf_columns()));
    }

    #[test]
    fn test_win_ansi_replaces_unsupported_chars() {
        assert_eq!(win_ansi_bytes("Grüße"), vec![b'G', b'r', 0xfc, 0xdf, b'e']);
        assert_eq!(win_ansi_bytes("日本"), b"??".to_vec());
    }

    #[test]
    fn test_export_pdf_writes_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.pdf");
        let content = (1..=80).map(|n| format!("Zeile {}", n)).collect::<Vec<_>>().join("\n");
        export_pdf(&content, &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_export_image_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let panel = ResultPanel {
            title: "Bullet points · English".to_string(),
            fragment: DisplayFragment::List(vec!["a".into(), "b".into()]),
            width: 60,
        };
        assert_eq!(export_image(&panel, &path), Some(path.clone()));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_rasterize_sizes_image_to_content() {
        let panel = ResultPanel {
            title: "T".to_string(),
            fragment: DisplayFragment::Paragraph("abc".into()),
            width: 60,
        };
        let img = rasterize(&panel).unwrap();
        assert_eq!(img.width(), PADDING * 2 + 3 * CELL);
        assert_eq!(img.height(), PADDING * 2 + 3 * (CELL + LINE_GAP));
    }

    struct EmptyRegion;

    impl Snapshot for EmptyRegion {
        fn title(&self) -> &str {
            "empty"
        }
        fn lines(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_export_image_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        assert_eq!(export_image(&EmptyRegion, &path), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::Txt.default_filename(), "wissen-kompaktor.txt");
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}

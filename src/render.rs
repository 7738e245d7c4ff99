//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use printpdf::*;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::layout_config::*;
use crate::style::FontFamily;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

/// Render a LayoutConfig into PDF bytes.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * PT_TO_MM);
    let page_h = Mm(config.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&config.title);
    doc.metadata.info.identifier = config.title.clone();

    let mut pages = Vec::new();
    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, config.page_height_pt);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let mut bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    if !bytes.starts_with(b"%PDF-") {
        return Err(Error::Render(format!(
            "backend returned {} bytes without a PDF header",
            bytes.len()
        )));
    }
    if !stamp_document_id(&mut bytes, &layout_digest(config)) {
        log::warn!("no trailer /ID found, output may differ between runs");
    }
    log::debug!(
        "rendered {} page(s) into {} bytes",
        config.pages.len().max(1),
        bytes.len()
    );
    Ok(bytes)
}

/// Hex sha256 of the serialised layout.
fn layout_digest(config: &LayoutConfig) -> Vec<u8> {
    Sha256::digest(config.to_json().as_bytes())
        .iter()
        .flat_map(|b| format!("{b:02X}").into_bytes())
        .collect()
}

/// Overwrite the trailer `/ID` strings, which printpdf fills with random
/// characters, with `digest` so that equal layouts give equal bytes. String
/// lengths are kept, so no offsets move. Returns false if no `/ID` array of
/// literal strings was found.
fn stamp_document_id(bytes: &mut [u8], digest: &[u8]) -> bool {
    let Some(key) = bytes.windows(3).rposition(|w| w == b"/ID") else {
        return false;
    };
    let mut pos = skip_whitespace(bytes, key + 3);
    if bytes.get(pos) != Some(&b'[') || digest.is_empty() {
        return false;
    }

    let mut stamped = 0usize;
    loop {
        pos = skip_whitespace(bytes, pos + 1);
        if bytes.get(pos) != Some(&b'(') {
            break;
        }
        let open = pos + 1;
        let Some(len) = bytes[open..].iter().position(|&b| b == b')') else {
            return false;
        };
        for (i, b) in bytes[open..open + len].iter_mut().enumerate() {
            *b = digest[(stamped * len + i) % digest.len()];
        }
        stamped += 1;
        pos = open + len;
    }
    stamped > 0
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: the result is not valid UTF-8 once any byte is >= 0x80, so it
    // must never reach a `str` API that inspects characters. It is only
    // handed to `TextItem::Text`; printpdf 0.8 encodes builtin-font text with
    // `lopdf::Document::encode_text(SimpleEncoding(b"WinAnsiEncoding"), ..)`,
    // and lopdf 0.35 maps that arm to a plain `text.as_bytes()` copy. Re-check
    // both when bumping printpdf or lopdf.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn builtin_font(text: &TextContent) -> BuiltinFont {
    match (text.font_family, text.bold, text.italic) {
        (FontFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
    }
}

fn rgb(c: &[f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn corner(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Corners of a box in PDF space, counter-clockwise from bottom-left.
fn rect_points(lbox: &LayoutBox, pdf_top: f32) -> Vec<LinePoint> {
    let (x1, y1) = (lbox.x, pdf_top - lbox.height);
    let (x2, y2) = (lbox.x + lbox.width, pdf_top);
    vec![
        corner(x1, y1),
        corner(x2, y1),
        corner(x2, y2),
        corner(x1, y2),
    ]
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(ops: &mut Vec<Op>, lbox: &LayoutBox, page_height: f32) {
    // PDF coordinate system: origin at bottom-left.
    // Our layout uses origin at top-left. Convert:
    let pdf_y = page_height - lbox.y;

    // Background
    if let Some(bg) = &lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(bg) });
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: rect_points(lbox, pdf_y),
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    // Border
    if let Some(border) = &lbox.border {
        ops.push(Op::SetOutlineColor {
            col: rgb(&border.color),
        });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(border.width),
        });
        ops.push(Op::DrawLine {
            line: Line {
                points: rect_points(lbox, pdf_y),
                is_closed: true,
            },
        });
    }

    // Text
    if let Some(text) = &lbox.text {
        let font = builtin_font(text);

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            let text_y = pdf_y - tline.y_offset - text.ascender;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(text_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetLineHeight {
                lh: Pt(text.line_height),
            });
            ops.push(Op::SetFillColor {
                col: rgb(&text.color),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(&tline.text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    // Children
    for child in &lbox.children {
        render_box(ops, child, page_height);
    }
}

//! Pipeline – ties together assembly, layout, pagination, rendering and
//! output encoding into a single function call.

use std::panic::{self, AssertUnwindSafe};

use crate::assembler::assemble;
use crate::encoding::{encode, OutputFormat, OutputPayload};
use crate::error::{Error, GenerationFailure, Result};
use crate::fonts::FontManager;
use crate::layout::compute_layout;
use crate::layout_config::LayoutConfig;
use crate::model::PrescriptionRecord;
use crate::pagination::{paginate, PAGE_MARGIN_PT};
use crate::render::render_pdf;

/// Page geometry in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    /// Page width (default: A4 = 595.28).
    pub width: f32,
    /// Page height (default: A4 = 841.89).
    pub height: f32,
    /// Margin on all four sides (default: 36).
    pub margin: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageSetup {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: PAGE_MARGIN_PT,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Reject geometry that leaves nothing to print on.
    pub fn validate(&self) -> Result<()> {
        let values = [self.width, self.height, self.margin];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidPage(format!("non-finite geometry {self:?}")));
        }
        if self.margin < 0.0 {
            return Err(Error::InvalidPage(format!("negative margin {}", self.margin)));
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(Error::InvalidPage(format!(
                "{}x{} pt page with {} pt margins has no printable area",
                self.width, self.height, self.margin
            )));
        }
        Ok(())
    }
}

/// Configuration for one generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub format: OutputFormat,
    pub page: PageSetup,
}

/// Generate only the layout config (no PDF rendering) – useful for testing.
pub fn compute_layout_config(
    record: &PrescriptionRecord,
    config: &GenerationConfig,
) -> Result<LayoutConfig> {
    let page = config.page;
    page.validate()?;

    // 1. Assemble sections
    let document = assemble(record);

    // 2. Compute layout
    let fonts = FontManager::default();
    let boxes = compute_layout(&document.blocks, page.width, page.margin, &fonts)?;
    log::debug!("laid out {} top-level block(s)", boxes.len());

    // 3. Paginate
    let mut layout_config = paginate(&boxes, page.width, page.height, page.margin, &fonts);
    layout_config.title = document.title;
    Ok(layout_config)
}

/// Full pipeline: record → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`.
pub fn generate_pdf(
    record: &PrescriptionRecord,
    config: &GenerationConfig,
) -> Result<(Vec<u8>, LayoutConfig)> {
    let layout_config = compute_layout_config(record, config)?;
    let pdf_bytes = render_pdf(&layout_config)?;
    Ok((pdf_bytes, layout_config))
}

/// Generate the prescription document in the configured output format.
///
/// Every fault, including a panic inside the layout or PDF backends, is
/// logged and reported as the same [`GenerationFailure`]; no partial output
/// is returned.
pub fn generate(
    record: &PrescriptionRecord,
    config: &GenerationConfig,
) -> std::result::Result<OutputPayload, GenerationFailure> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| generate_pdf(record, config)));
    match outcome {
        Ok(Ok((bytes, _))) => Ok(encode(bytes, config.format)),
        Ok(Err(err)) => Err(err.into()),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("Unhandled exception: {detail}");
            Err(GenerationFailure::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatientSummary;

    fn record() -> PrescriptionRecord {
        PrescriptionRecord {
            id: "rx-42".into(),
            patient: PatientSummary {
                name: "Jane Roe".into(),
                age: Some("31".into()),
                ..Default::default()
            },
            tests: vec!["CBC".into()],
            ..Default::default()
        }
    }

    #[test]
    fn pipeline_basic() {
        let (bytes, config) = generate_pdf(&record(), &GenerationConfig::default()).unwrap();
        assert!(!bytes.is_empty());
        assert!(!config.pages.is_empty());
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(config.title, "Prescription - rx-42");
    }

    #[test]
    fn a4_defaults() {
        let page = PageSetup::default();
        assert!((page.width - 595.28).abs() < 0.01);
        assert!((page.height - 841.89).abs() < 0.01);
        assert!((page.margin - 36.0).abs() < 0.01);
        assert!(page.validate().is_ok());
    }

    #[test]
    fn margins_wider_than_page_are_rejected() {
        let config = GenerationConfig {
            page: PageSetup {
                width: 60.0,
                height: 841.89,
                margin: 36.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            compute_layout_config(&record(), &config),
            Err(Error::InvalidPage(_))
        ));
        let failure = generate(&record(), &config).unwrap_err();
        assert_eq!(failure.message, GenerationFailure::MESSAGE);
    }

    #[test]
    fn text_safe_output_is_ascii() {
        let config = GenerationConfig {
            format: OutputFormat::TextSafe,
            ..Default::default()
        };
        match generate(&record(), &config).unwrap() {
            OutputPayload::TextSafe(text) => {
                assert!(text.is_ascii());
                // base64 of "%PDF-"
                assert!(text.starts_with("JVBERi"));
            }
            other => panic!("expected text payload, got {} bytes", other.len()),
        }
    }

    #[test]
    fn oversized_row_run_fails_without_panicking() {
        let record = PrescriptionRecord {
            follow_up: (0..33_000).map(|i| format!("note {i}")).collect(),
            ..record()
        };
        let config = GenerationConfig::default();
        assert!(matches!(
            compute_layout_config(&record, &config),
            Err(Error::TooManyRows { rows: 33_000, .. })
        ));
        let failure = generate(&record, &config).unwrap_err();
        assert_eq!(failure.message, GenerationFailure::MESSAGE);
    }
}

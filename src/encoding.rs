//! Output encoding – raw PDF bytes or their base64 text.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

/// How the finished document is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raw PDF bytes.
    #[default]
    Binary,
    /// Standard, padded base64 of the PDF bytes.
    TextSafe,
}

impl OutputFormat {
    /// Map a `PDFReturnFormat` request value onto a format. Only `base64`
    /// (any case) selects [`OutputFormat::TextSafe`].
    pub fn from_return_format(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("base64") => Self::TextSafe,
            _ => Self::Binary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPayload {
    Binary(Vec<u8>),
    TextSafe(String),
}

impl OutputPayload {
    /// The bytes to write out: the PDF itself or the ASCII of its base64.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Binary(bytes) => bytes,
            Self::TextSafe(text) => text.into_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::TextSafe(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn encode(bytes: Vec<u8>, format: OutputFormat) -> OutputPayload {
    match format {
        OutputFormat::Binary => OutputPayload::Binary(bytes),
        OutputFormat::TextSafe => OutputPayload::TextSafe(BASE64_STD.encode(&bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_safe_decodes_to_input_bytes() {
        let bytes = b"%PDF-1.7\n\x00\xff\x80 binary tail".to_vec();
        let OutputPayload::TextSafe(text) = encode(bytes.clone(), OutputFormat::TextSafe) else {
            panic!("expected text payload");
        };
        assert!(text.is_ascii());
        assert_eq!(BASE64_STD.decode(text).unwrap(), bytes);
    }

    #[test]
    fn binary_passes_through() {
        let bytes = vec![1, 2, 3];
        assert_eq!(
            encode(bytes.clone(), OutputFormat::Binary),
            OutputPayload::Binary(bytes)
        );
    }

    #[test]
    fn return_format_header() {
        assert_eq!(OutputFormat::from_return_format(Some("Base64")), OutputFormat::TextSafe);
        assert_eq!(OutputFormat::from_return_format(Some("BASE64")), OutputFormat::TextSafe);
        assert_eq!(OutputFormat::from_return_format(Some("pdf")), OutputFormat::Binary);
        assert_eq!(OutputFormat::from_return_format(None), OutputFormat::Binary);
    }
}

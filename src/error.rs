//! Error types.
//!
//! [`Error`] covers the faults of the individual stages. Callers of
//! [`crate::generate`] only ever see [`GenerationFailure`].

/// Result type alias for the internal pipeline stages.
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised while laying out or rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The page geometry leaves no printable area.
    #[error("Invalid page setup: {0}")]
    InvalidPage(String),

    /// A table has more grid rows than the layout engine can address.
    #[error("Table has {rows} rows, the grid holds at most {max}")]
    TooManyRows { rows: usize, max: usize },

    /// Taffy rejected the layout tree.
    #[error("Layout engine error: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// The PDF backend produced no usable output.
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// The single failure a generation call reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GenerationFailure {
    pub message: String,
}

impl GenerationFailure {
    /// Message shown to callers regardless of the underlying cause.
    pub const MESSAGE: &'static str = "An error occurred while generating prescription PDF";

    pub fn new() -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
        }
    }
}

impl Default for GenerationFailure {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Error> for GenerationFailure {
    fn from(err: Error) -> Self {
        log::error!("Unhandled exception: {err}");
        Self::new()
    }
}

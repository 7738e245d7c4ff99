//! # rx-forge – prescription record → PDF pipeline
//!
//! This crate turns one prescription record into a paginated A4 PDF. The
//! pipeline stages are:
//!
//! 1. **Assemble** – run the section builders in print order ([`sections`],
//!    [`assembler`]) over the record ([`model`])
//! 2. **Layout** – compute flexbox/grid layout with Taffy ([`layout`])
//! 3. **Paginate** – split into pages, honouring keep-together blocks
//!    ([`pagination`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//! 5. **Encode** – hand back raw bytes or base64 text ([`encoding`])
//!
//! [`generate`] runs all of it and reports any failure as a single
//! [`GenerationFailure`].

pub mod assembler;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod node;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod sections;
pub mod style;
pub mod table;

// Re-exports for convenience
pub use encoding::{OutputFormat, OutputPayload};
pub use error::{Error, GenerationFailure};
pub use model::{output_file_name, PrescriptionRecord};
pub use pipeline::{generate, generate_pdf, GenerationConfig, PageSetup};

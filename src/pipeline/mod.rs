//! Pipeline stages shared by the conversion strategies.
//!
//! Each submodule implements one step. Strategies in [`crate::strategy`]
//! compose them; none of them decides on fallback by itself.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ render ──▶ markup ──▶ pandoc ──▶ doc
//! (%PDF)   (pdftotext) (pdftocairo) (HTML)   (odt/docx)  (docx→doc)
//! ```
//!
//! 1. [`input`]     — validate the source PDF; resolve the output location
//! 2. [`extract`]   — `pdftotext`, with a plain-mode retry on empty output
//! 3. [`render`]    — one SVG per page via `pdfinfo` + `pdftocairo`
//! 4. [`markup`]    — text cleanup and HTML assembly
//! 5. [`pandoc`]    — every format conversion pandoc can do
//! 6. [`doc`]       — DOCX → DOC via LibreOffice or unoconv, or substitution
//!
//! [`tools`] is the process seam under all of them and [`workspace`] owns
//! the scratch directory they write into.

pub mod doc;
pub mod extract;
pub mod input;
pub mod markup;
pub mod pandoc;
pub mod render;
pub mod tools;
pub mod workspace;

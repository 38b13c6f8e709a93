//! Pipeline stages behind the default extraction strategies.
//!
//! ```text
//! direct:  input ──▶ pdfium ──▶ text
//! OCR:     input ──▶ pdfium ──▶ render ──▶ llm ──▶ postprocess
//! ```
//!
//! 1. [`input`]       — validate the path names a readable PDF
//! 2. [`pdfium`]      — bind the library, open documents, read the info dictionary
//! 3. [`text`]        — read the embedded text layer page by page
//! 4. [`render`]      — rasterise pages and PNG/base64-encode them for OCR
//! 5. [`llm`]         — transcribe one page with a vision model, with retry
//! 6. [`postprocess`] — deterministic cleanup of the model's transcription
//!
//! The pdfium stages are blocking and always run inside `spawn_blocking`.

pub mod input;
pub mod llm;
pub mod pdfium;
pub mod postprocess;
pub mod render;
pub mod text;

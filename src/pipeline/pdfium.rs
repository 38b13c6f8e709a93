//! pdfium binding and document loading shared by text extraction and OCR
//! rendering.
//!
//! Everything here is blocking; callers run it inside `spawn_blocking`.

use crate::error::IngestError;
use crate::output::DocumentInfo;
use pdfium_render::prelude::*;
use std::path::Path;

/// Environment variable naming a directory that contains libpdfium.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying `$PDFIUM_LIB_PATH`, the working directory, then
/// the system library search path.
pub fn create_pdfium() -> Result<Pdfium, IngestError> {
    let from_env = std::env::var(PDFIUM_LIB_PATH_ENV)
        .ok()
        .filter(|p| !p.is_empty());

    let bindings = match from_env {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| IngestError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Open a document, mapping pdfium's load error to a specific variant.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, IngestError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                IngestError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                IngestError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            IngestError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Read the info dictionary. Empty values are treated as absent.
pub fn document_info(document: &PdfDocument<'_>) -> DocumentInfo {
    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentInfo {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
    }
}

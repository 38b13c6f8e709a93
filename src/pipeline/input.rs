//! Input validation: make sure the path names a readable PDF before pdfium
//! touches it.
//!
//! pdfium reports a missing file, a permission problem, and a JPEG renamed to
//! `.pdf` all as the same opaque load failure. Checking up front turns those
//! into distinct [`IngestError`] variants the caller can act on.

use crate::error::IngestError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Validate existence, read permission, and the `%PDF` magic bytes.
pub fn validate_pdf(path: &Path) -> Result<(), IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(IngestError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(IngestError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(())
}

/// `file://` locator recorded as the artifact's source URL.
pub fn source_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

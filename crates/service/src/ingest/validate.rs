use docqa_core::constants::{ACCEPTED_CONTENT_TYPE, PDF_MAGIC};

use crate::error::ServiceError;

/// Checks an upload before any of it is written to disk.
///
/// The declared content type must be `application/pdf` (parameters ignored),
/// the body must be non-empty, within `max_bytes`, and start with the PDF
/// header.
pub fn validate_upload(
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(), ServiceError> {
    let essence = content_type.and_then(|ct| ct.split(';').next()).map(str::trim).unwrap_or("");
    if !essence.eq_ignore_ascii_case(ACCEPTED_CONTENT_TYPE) {
        let shown = if essence.is_empty() { "none" } else { essence };
        return Err(ServiceError::Validation(format!(
            "invalid file type {shown}; only {ACCEPTED_CONTENT_TYPE} is accepted"
        )));
    }
    if bytes.is_empty() {
        return Err(ServiceError::Validation("uploaded file is empty".to_owned()));
    }
    if bytes.len() > max_bytes {
        return Err(ServiceError::PayloadTooLarge { limit: max_bytes, actual: bytes.len() });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ServiceError::Validation("uploaded file is not a PDF document".to_owned()));
    }
    Ok(())
}

//! MIME utilities shared across modules

pub const PDF_MIME: &str = "application/pdf";
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Lowercased main type without parameters (`application/pdf; charset=x` -> `application/pdf`).
#[must_use]
pub fn canonicalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Whether a download looks like a PDF: declared content type, `.pdf` URL
/// suffix, or the `%PDF-` magic at the start of the body.
#[must_use]
pub fn looks_like_pdf(content_type: Option<&str>, url: &str, head: &[u8]) -> bool {
    let declared = content_type
        .map(canonicalize_mime)
        .is_some_and(|ct| ct.contains(PDF_MIME));
    declared || url.to_ascii_lowercase().ends_with(".pdf") || head.starts_with(PDF_MAGIC)
}

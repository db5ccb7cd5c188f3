//! Input resolution: normalise a user-supplied path or URL to in-memory
//! PDF bytes.
//!
//! ## Why bytes, not a path?
//!
//! Everything downstream (text pass, image pass) re-reads the document from
//! the start, and pdfium can open a byte slice directly. Resolving to one
//! owned buffer up front means the two extraction passes are independent
//! and repeatable, with no seek/rewind bookkeeping and no temp files to
//! clean up. We validate the PDF magic bytes (`%PDF`) before returning so
//! callers get a meaningful error rather than a pdfium parse failure.

use crate::error::PdfSumError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to validated PDF bytes.
///
/// If the input is a URL, download it into memory. If it is a local file,
/// read it, mapping I/O failures to the specific error variants.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Vec<u8>, PdfSumError> {
    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };

    validate_magic(&bytes, input)?;
    Ok(bytes)
}

/// Reject anything whose first bytes are not `%PDF`.
pub(crate) fn validate_magic(bytes: &[u8], source_name: &str) -> Result<(), PdfSumError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(PdfSumError::NotAPdf {
            source_name: source_name.to_string(),
            magic,
        });
    }
    Ok(())
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, PdfSumError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PdfSumError::FileNotFound { path });
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PdfSumError::PermissionDenied { path })
        }
        Err(_) => Err(PdfSumError::FileNotFound { path }),
    }
}

/// Download a URL straight into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, PdfSumError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfSumError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfSumError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(validate_magic(b"%PDF-1.7\n...", "x.pdf").is_ok());
    }

    #[test]
    fn magic_rejects_other_formats() {
        let err = validate_magic(b"PK\x03\x04rest", "x.pdf").unwrap_err();
        assert!(matches!(err, PdfSumError::NotAPdf { .. }));

        // Too short to even hold the magic.
        assert!(validate_magic(b"%P", "x.pdf").is_err());
        assert!(validate_magic(b"", "x.pdf").is_err());
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = resolve_input("/no/such/file.pdf", 5).await.unwrap_err();
        assert!(matches!(err, PdfSumError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn local_non_pdf_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"just some text").unwrap();
        let err = resolve_input(f.path().to_str().unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfSumError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn local_pdf_bytes_round_trip() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4 fake body").unwrap();
        let bytes = resolve_input(f.path().to_str().unwrap(), 5).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 fake body");
    }
}

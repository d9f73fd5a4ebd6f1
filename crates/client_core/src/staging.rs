use std::path::Path;

use crate::error::{ClientError, Result};

pub const ACCEPTED_MIME_TYPE: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ClientError::ValidationFailed(format!("cannot read {}: {err}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "documento.pdf".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A validated file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile(FileHandle);

impl StagedFile {
    pub fn validate(file: FileHandle) -> Result<Self> {
        if !file.mime_type.eq_ignore_ascii_case(ACCEPTED_MIME_TYPE) {
            return Err(ClientError::ValidationFailed(format!(
                "only PDF files are accepted, {} is {}",
                file.name, file.mime_type
            )));
        }
        if file.size() > MAX_UPLOAD_BYTES {
            return Err(ClientError::ValidationFailed(format!(
                "{} is {}, the limit is {}",
                file.name,
                format_file_size(file.size()),
                format_file_size(MAX_UPLOAD_BYTES)
            )));
        }
        Ok(Self(file))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn mime_type(&self) -> &str {
        &self.0.mime_type
    }

    pub fn size(&self) -> u64 {
        self.0.size()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0.bytes
    }
}

/// Human-readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn accepts_pdf_under_limit() {
        let staged = StagedFile::validate(FileHandle::new(
            "factura.pdf",
            ACCEPTED_MIME_TYPE,
            vec![0; 9 * MIB],
        ))
        .expect("9 MiB pdf");
        assert_eq!(staged.size(), 9 * MIB as u64);
    }

    #[test]
    fn accepts_pdf_exactly_at_limit() {
        assert!(StagedFile::validate(FileHandle::new(
            "limite.pdf",
            ACCEPTED_MIME_TYPE,
            vec![0; 10 * MIB],
        ))
        .is_ok());
    }

    #[test]
    fn rejects_oversized_pdf_and_non_pdf() {
        let oversized = StagedFile::validate(FileHandle::new(
            "grande.pdf",
            ACCEPTED_MIME_TYPE,
            vec![0; 11 * MIB],
        ))
        .expect_err("11 MiB must be rejected");
        assert!(matches!(oversized, ClientError::ValidationFailed(_)));

        let wrong_type =
            StagedFile::validate(FileHandle::new("foto.png", "image/png", vec![0; 5 * MIB]))
                .expect_err("png must be rejected");
        assert!(wrong_type.to_string().contains("only PDF"));
    }

    #[test]
    fn formats_sizes_like_the_upload_preview() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[tokio::test]
    async fn from_path_guesses_pdf_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conocimiento.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.expect("write");

        let handle = FileHandle::from_path(&path).await.expect("handle");
        assert_eq!(handle.name, "conocimiento.pdf");
        assert_eq!(handle.mime_type, ACCEPTED_MIME_TYPE);
        assert_eq!(handle.size(), 8);
    }
}

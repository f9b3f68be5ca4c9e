//! Uploaded image files.

use crate::core::{ALLOWED_EXTENSIONS, ValidationError};

/// Raw bytes of an uploaded file plus the filename the client declared.
///
/// Construction checks the extension, so a `SourceImage` always carries one of
/// the allowed image extensions. Whether the bytes really are an image is only
/// known once they are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    filename: String,
    extension: String,
    bytes: Vec<u8>,
}

impl SourceImage {
    /// Validates `filename` and wraps the file contents.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let filename = filename.into();
        let extension = allowed_extension(&filename)?;
        Ok(Self {
            filename,
            extension,
            bytes,
        })
    }

    /// Reads a file from disk, validating its name first.
    ///
    /// The file is not opened when the extension is rejected.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, crate::core::LesionError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        allowed_extension(&filename)?;
        let bytes = std::fs::read(path)?;
        Ok(Self::new(filename, bytes)?)
    }

    /// The filename as declared by the client.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The lowercased extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Returns true if `filename` has an allowed image extension.
pub fn is_allowed_file(filename: &str) -> bool {
    allowed_extension(filename).is_ok()
}

/// Extracts and checks the extension after the last dot.
fn allowed_extension(filename: &str) -> Result<String, ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));

    extension.ok_or_else(|| ValidationError::DisallowedExtension {
        filename: filename.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LesionError;
    use std::io::Write;

    #[test]
    fn test_allowed_extensions_case_insensitive() {
        for name in ["a.png", "b.JPG", "c.jpeg", "d.Gif", "e.bmp", "archive.tar.png"] {
            assert!(is_allowed_file(name), "{name} should be allowed");
        }
        assert_eq!(SourceImage::new("B.JPG", vec![]).unwrap().extension(), "jpg");
    }

    #[test]
    fn test_rejected_names() {
        for name in ["malware.exe", "noextension", "png", "image.png.exe", "trailingdot."] {
            assert_eq!(
                SourceImage::new(name, vec![1, 2, 3]).unwrap_err(),
                ValidationError::DisallowedExtension {
                    filename: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_empty_filename() {
        assert_eq!(
            SourceImage::new("", vec![]).unwrap_err(),
            ValidationError::EmptyFilename
        );
    }

    #[test]
    fn test_from_path_rejects_before_reading() {
        // The file does not exist; validation must fail first, not IO.
        let err = SourceImage::from_path("/nonexistent/dir/malware.exe").unwrap_err();
        assert!(matches!(
            err,
            LesionError::Validation(ValidationError::DisallowedExtension { .. })
        ));
    }

    #[test]
    fn test_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"bytes")
            .unwrap();

        let source = SourceImage::from_path(&path).unwrap();
        assert_eq!(source.filename(), "scan.png");
        assert_eq!(source.bytes(), b"bytes");
    }
}

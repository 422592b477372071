use crate::domain::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub fn is_pdf_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Keeps the latest copy of each accepted upload under the configured
/// directory. Uploads sharing a sanitised name overwrite one another.
pub struct UploadStore {
    uploads_dir: PathBuf,
}

impl UploadStore {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        if !fs::try_exists(&self.uploads_dir).await? {
            fs::create_dir_all(&self.uploads_dir).await?;
        }
        Ok(())
    }

    /// Writes `bytes` under the sanitised filename and returns the path.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.uploads_dir.join(sanitize_filename(filename));
        fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(path)
    }
}

fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_check_is_case_insensitive() {
        assert!(is_pdf_filename("story.pdf"));
        assert!(is_pdf_filename("STORY.PDF"));
        assert!(!is_pdf_filename("story.docx"));
        assert!(!is_pdf_filename("pdf"));
        assert!(!is_pdf_filename(""));
    }

    #[test]
    fn test_sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("consent form (v2).pdf"), "consent_form__v2_.pdf");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_writes_bytes() {
        let temp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(temp.path().join("nested").join("uploads"));

        let path = store.save("story.pdf", b"%PDF-1.4").await.unwrap();

        assert_eq!(path, store.uploads_dir().join("story.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_repeated_uploads_overwrite_by_name() {
        let temp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(temp.path());

        store.save("story.pdf", b"first").await.unwrap();
        let path = store.save("../story.pdf", b"second").await.unwrap();
        store.save("other.pdf", b"third").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 2);
    }
}

//! Image store for guideline attachments.
//!
//! Files land in the upload directory under `{unix_millis}-{random}{.ext}` and
//! are served back from `/uploads/{file}`. Only that served path is persisted.

use crate::errors::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// URL prefix under which stored images are served.
pub const URL_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

/// Lowercased alphanumeric extension of `name`, with its dot, or empty.
fn sanitized_extension(name: &str) -> String {
    let extension: String = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if extension.is_empty() {
        extension
    } else {
        format!(".{extension}")
    }
}

fn generated_file_name(original_name: Option<&str>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitized_extension(original_name.unwrap_or_default())
    )
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the upload directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        debug!("Upload directory ready at {}", self.dir.display());
        Ok(())
    }

    /// Deletes a file previously returned by [`ImageStore::save`]. Paths outside
    /// the store are ignored.
    pub async fn remove(&self, served_path: &str) -> Result<()> {
        let Some(file_name) = served_path
            .strip_prefix(URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            return Ok(());
        };
        tokio::fs::remove_file(self.dir.join(file_name)).await?;
        debug!("Removed image {}", file_name);
        Ok(())
    }

    /// Writes `bytes` under a fresh name and returns the served path.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        self.ensure_dir().await?;
        let file_name = generated_file_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        info!("Stored image {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{URL_PREFIX}/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("scan.PNG"), ".png");
        assert_eq!(sanitized_extension("archive.tar.gz"), ".gz");
        assert_eq!(sanitized_extension("noext"), "");
        assert_eq!(sanitized_extension("weird.j$p g"), ".jpg");
    }

    #[test]
    fn test_generated_file_name_shape() {
        let name = generated_file_name(Some("nodule.JPG"));
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let (random, ext) = rest.split_once('.').unwrap();
        assert!(random.parse::<u64>().unwrap() < 1_000_000_000);
        assert_eq!(ext, "jpg");
    }

    #[tokio::test]
    async fn test_save_writes_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path().join("uploads"));

        let url = store.save(Some("a.png"), b"\x89PNG").await?;

        let file_name = url.strip_prefix("/uploads/").unwrap();
        let written = tokio::fs::read(store.dir().join(file_name)).await?;
        assert_eq!(written, b"\x89PNG");

        store.remove(&url).await?;
        assert!(!store.dir().join(file_name).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());

        store.remove("/static/logo.png").await?;
        store.remove("/uploads/../secret").await?;
        store.remove("/uploads/").await?;
        Ok(())
    }
}

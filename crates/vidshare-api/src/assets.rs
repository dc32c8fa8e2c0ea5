use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

/// Content-addressed media storage on local disk.
///
/// Each asset is stored once at `{dir}/{sha256}.{ext}` and addressed as
/// `{base_url}/{sha256}.{ext}`.
pub struct AssetStore {
    dir: PathBuf,
    base_url: String,
}

impl AssetStore {
    pub async fn new(dir: PathBuf, base_url: &str) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Asset storage directory: {}", dir.display());
        Ok(Self {
            dir,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Store `data` and return the URL it can be fetched from.
    pub async fn store(&self, original_name: Option<&str>, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            bail!("refusing to store an empty asset");
        }

        let mut hasher = Sha256::new();
        hasher.update(data);
        let digest = hex::encode(hasher.finalize());

        let name = match original_name.and_then(extension) {
            Some(ext) => format!("{digest}.{ext}"),
            None => digest,
        };

        let path = self.dir.join(&name);
        if fs::try_exists(&path).await? {
            return Ok(self.url_for(&name));
        }

        // Write under a per-call temporary name so a crash never leaves a
        // truncated asset and concurrent uploads of the same bytes never share
        // a partial file.
        let tmp = self.dir.join(format!(".{name}.{}.partial", Uuid::new_v4()));
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(data).await?;
        file.flush().await?;
        drop(file);
        fs::rename(&tmp, &path).await?;

        info!("Stored asset {} ({} bytes)", name, data.len());
        Ok(self.url_for(&name))
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

/// Lowercased alphanumeric extension of an uploaded file name, if any.
fn extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::config::MediaConfig;
use crate::error::Result;

/// Chunk size used for both writing and hash verification
const CHUNK_SIZE: usize = 1024 * 1024;

/// Extensions carried over from the original upload filename; anything else
/// is stored as a generic binary file.
const KNOWN_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".webp", ".gif", ".pdf", ".doc", ".docx",
];

/// Where a blob lives on disk and how it may be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Result of persisting one uploaded byte stream
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Path relative to the visibility root, e.g. "resumes/ab12...cd.pdf"
    pub storage_path: String,
    /// Browser-reachable URL for public blobs, empty for private ones
    pub public_url: String,
    pub size_bytes: i64,
    pub sha256_hex: String,
}

/// Local file system blob store with visibility-scoped roots
pub struct BlobStore {
    public_root: PathBuf,
    private_root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    /// Create the store, making sure both roots exist
    pub fn new(config: &MediaConfig) -> Result<Self> {
        let public_root = PathBuf::from(&config.public_root);
        let private_root = PathBuf::from(&config.private_root);
        std::fs::create_dir_all(&public_root)?;
        std::fs::create_dir_all(&private_root)?;

        Ok(Self {
            public_root,
            private_root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn root_for(&self, visibility: Visibility) -> &Path {
        match visibility {
            Visibility::Public => &self.public_root,
            Visibility::Private => &self.private_root,
        }
    }

    /// Absolute on-disk path for a stored blob
    pub fn absolute_path(&self, visibility: Visibility, storage_path: &str) -> PathBuf {
        self.root_for(visibility).join(storage_path)
    }

    /// Persist an uploaded byte stream under `{root}/{kind}/{token}{ext}`.
    ///
    /// The stream is copied to disk in fixed-size chunks while a SHA-256
    /// digest and byte counter are updated incrementally, so the file is
    /// never held in memory as a whole.
    pub async fn store<R>(
        &self,
        mut reader: R,
        visibility: Visibility,
        kind: &str,
        original_filename: &str,
    ) -> Result<StoredBlob>
    where
        R: AsyncRead + Unpin,
    {
        let ext = safe_ext(original_filename);
        let filename = format!("{}{}", random_token(), ext);

        let base_dir = self.root_for(visibility).join(kind);
        fs::create_dir_all(&base_dir).await?;
        let dest = base_dir.join(&filename);

        let mut out = fs::File::create(&dest).await?;
        let mut hasher = Sha256::new();
        let mut size_bytes: i64 = 0;
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            size_bytes += n as i64;
            out.write_all(&buf[..n]).await?;
        }
        out.flush().await?;

        let storage_path = format!("{}/{}", kind, filename);
        let public_url = match visibility {
            Visibility::Public => format!("{}/{}", self.public_base_url, storage_path),
            Visibility::Private => String::new(),
        };

        tracing::debug!("Stored blob at {:?} ({} bytes)", dest, size_bytes);

        Ok(StoredBlob {
            storage_path,
            public_url,
            size_bytes,
            sha256_hex: hex::encode(hasher.finalize()),
        })
    }

    /// Recompute the SHA-256 of a file on disk, chunked like the write path
    pub async fn hash_file(&self, path: &Path) -> Result<String> {
        let mut file = fs::File::open(path).await?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

/// 16 random bytes, hex-encoded
fn random_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Lower-cased extension of the original filename, or ".bin" when it is
/// missing or not one we recognize
fn safe_ext(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    if KNOWN_EXTENSIONS.contains(&ext.as_str()) {
        ext
    } else {
        ".bin".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> BlobStore {
        let config = MediaConfig {
            public_root: dir.path().join("pub").to_string_lossy().to_string(),
            private_root: dir.path().join("priv").to_string_lossy().to_string(),
            public_base_url: "/media".to_string(),
        };
        BlobStore::new(&config).unwrap()
    }

    #[tokio::test]
    async fn store_private_computes_size_and_digest() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let blob = store
            .store(&b"hello"[..], Visibility::Private, "resumes", "cv.pdf")
            .await
            .unwrap();

        assert_eq!(blob.size_bytes, 5);
        assert_eq!(
            blob.sha256_hex,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(blob.storage_path.starts_with("resumes/"));
        assert!(blob.storage_path.ends_with(".pdf"));
        assert!(blob.public_url.is_empty());

        let on_disk = store.absolute_path(Visibility::Private, &blob.storage_path);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn store_public_builds_url() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let blob = store
            .store(&b"img"[..], Visibility::Public, "hero_image", "Banner.PNG")
            .await
            .unwrap();

        assert!(blob.storage_path.ends_with(".png"));
        assert_eq!(blob.public_url, format!("/media/{}", blob.storage_path));
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_bin() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let blob = store
            .store(&b"x"[..], Visibility::Private, "resumes", "run.exe")
            .await
            .unwrap();
        assert!(blob.storage_path.ends_with(".bin"));

        let blob = store
            .store(&b"x"[..], Visibility::Private, "resumes", "no-extension")
            .await
            .unwrap();
        assert!(blob.storage_path.ends_with(".bin"));
    }

    #[tokio::test]
    async fn hash_file_matches_store_digest() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let blob = store
            .store(&b"some resume bytes"[..], Visibility::Private, "resumes", "cv.docx")
            .await
            .unwrap();

        let path = store.absolute_path(Visibility::Private, &blob.storage_path);
        assert_eq!(store.hash_file(&path).await.unwrap(), blob.sha256_hex);
    }

    #[tokio::test]
    async fn tokens_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let a = store
            .store(&b"a"[..], Visibility::Private, "resumes", "a.pdf")
            .await
            .unwrap();
        let b = store
            .store(&b"a"[..], Visibility::Private, "resumes", "a.pdf")
            .await
            .unwrap();
        assert_ne!(a.storage_path, b.storage_path);
    }
}

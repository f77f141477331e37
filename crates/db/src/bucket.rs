//! Filesystem-backed blob bucket.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::sniff::{self, SNIFF_LEN};
use crate::StoreError;

/// Metadata describing a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub filename: String,
    pub length: u64,
    pub content_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub modified: OffsetDateTime,
}

/// An opened blob, positioned at its first byte.
#[derive(Debug)]
pub struct Blob {
    pub info: BlobInfo,
    pub file: File,
}

/// Flat directory of named blobs.
///
/// Filenames are single path components; anything that could escape the root
/// resolves to "absent".
#[derive(Debug, Clone)]
pub struct FsBucket {
    root: PathBuf,
}

impl FsBucket {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let unsafe_name = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0']);
        if unsafe_name {
            return None;
        }
        Some(self.root.join(filename))
    }

    /// Open a blob by filename; `Ok(None)` when no such blob exists.
    pub async fn open(&self, filename: &str) -> Result<Option<Blob>, StoreError> {
        let Some(path) = self.resolve(filename) else {
            tracing::debug!(target: "bookshop-db", filename, "rejected blob name");
            return Ok(None);
        };

        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        let mut head = [0u8; SNIFF_LEN];
        let read = read_head(&mut file, &mut head).await?;
        file.rewind().await?;

        let info = BlobInfo {
            filename: filename.to_string(),
            length: metadata.len(),
            content_type: sniff::content_type(&head[..read]).to_string(),
            modified: modified_at(&metadata),
        };

        Ok(Some(Blob { info, file }))
    }

    /// Describe every blob in the bucket, ordered by filename.
    pub async fn list(&self) -> Result<Vec<BlobInfo>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut blobs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(filename) = entry.file_name().into_string() else {
                tracing::warn!(
                    target: "bookshop-db",
                    path = %entry.path().display(),
                    "skipping blob with non utf-8 name"
                );
                continue;
            };
            if let Some(blob) = self.open(&filename).await? {
                blobs.push(blob.info);
            }
        }

        blobs.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(blobs)
    }
}

async fn read_head(file: &mut File, head: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn modified_at(metadata: &std::fs::Metadata) -> OffsetDateTime {
    metadata
        .modified()
        .map(OffsetDateTime::from)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn bucket_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, FsBucket) {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in files {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }
        let bucket = FsBucket::new(dir.path());
        (dir, bucket)
    }

    #[tokio::test]
    async fn open_sniffs_and_rewinds() {
        let mut png = PNG_HEADER.to_vec();
        png.extend_from_slice(b"rest-of-image");
        let (_dir, bucket) = bucket_with(&[("dune.png", &png)]);

        let mut blob = bucket.open("dune.png").await.unwrap().unwrap();
        assert_eq!(blob.info.content_type, "image/png");
        assert_eq!(blob.info.length, png.len() as u64);

        let mut contents = Vec::new();
        blob.file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, png);
    }

    #[tokio::test]
    async fn missing_blob_is_absent() {
        let (_dir, bucket) = bucket_with(&[]);
        assert!(bucket.open("nope.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn traversal_names_are_absent() {
        let (dir, bucket) = bucket_with(&[("inner.jpg", b"x")]);
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        for name in ["", ".", "..", "../inner.jpg", "nested/inner.jpg", "a\\b"] {
            assert!(bucket.open(name).await.unwrap().is_none(), "{name}");
        }
        assert!(bucket.open("nested").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_sorted_and_skips_directories() {
        let (dir, bucket) = bucket_with(&[("b.gif", b"GIF89a.."), ("a.bin", b"raw")]);
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let listed = bucket.list().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|b| b.filename.as_str()).collect();

        assert_eq!(names, vec!["a.bin", "b.gif"]);
        assert_eq!(listed[0].content_type, "application/octet-stream");
        assert_eq!(listed[1].content_type, "image/gif");
    }

    #[tokio::test]
    async fn list_of_missing_root_is_empty() {
        let bucket = FsBucket::new("/definitely/not/a/bookshop/dir");
        assert!(bucket.list().await.unwrap().is_empty());
    }
}

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;

use crate::error::{BookError, Result};

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Create `path` and any missing parents. Existing directories are fine.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| BookError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the whole text, replacing any existing file.
pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).await.map_err(|source| BookError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole file as UTF-8, replacing invalid sequences.
pub async fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await.map_err(|source| BookError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Sequential fixed-size chunks of a file.
pub struct ChunkReader {
    path: PathBuf,
    file: File,
    len: u64,
    buf: Vec<u8>,
}

impl ChunkReader {
    pub async fn open(path: &Path) -> Result<Self> {
        let read_err = |source| BookError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).await.map_err(read_err)?;
        let len = file.metadata().await.map_err(read_err)?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            buf: vec![0; CHUNK_SIZE],
        })
    }

    /// Total file size in bytes, as reported when opened.
    pub fn byte_len(&self) -> u64 {
        self.len
    }

    /// Next chunk, or `None` at end of file.
    pub async fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        let n = self
            .file
            .read(&mut self.buf)
            .await
            .map_err(|source| BookError::Read {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(&self.buf[..n]))
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).await.unwrap();
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.txt");
        write_text(&path, "first version").await.unwrap();
        write_text(&path, "second").await.unwrap();
        assert_eq!(read_text(&path).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        match read_text(&path).await {
            Err(BookError::Read { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn chunks_cover_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let text = "x".repeat(CHUNK_SIZE * 2 + 17);
        write_text(&path, &text).await.unwrap();

        let mut reader = ChunkReader::open(&path).await.unwrap();
        assert_eq!(reader.byte_len(), text.len() as u64);
        let mut total = 0;
        while let Some(chunk) = reader.next_chunk().await.unwrap() {
            total += chunk.len();
        }
        assert_eq!(total, text.len());
    }
}

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::AssetError;

/// Byte progress callback: `(loaded, total)`. `total` is 0 when unknown.
pub type Progress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

fn no_progress(_loaded: u64, _total: u64) {}

/// 资产读取器 Trait
///
/// Asynchronous byte source for asset references such as `/assets/motions/idle.json`.
pub trait AssetReader: Send + Sync {
    /// Reads the whole asset, reporting byte progress as chunks arrive.
    fn read_bytes_with_progress(
        &self,
        uri: &str,
        progress: Progress<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;

    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send {
        self.read_bytes_with_progress(uri, &no_progress)
    }
}

/// Asset references are site-absolute; readers resolve them relative to their own root.
fn relative_key(uri: &str) -> &str {
    uri.trim_start_matches('/')
}

/// 本地文件读取器
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileAssetReader {
    root_path: PathBuf,
    chunk_size: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileAssetReader {
    const DEFAULT_CHUNK: usize = 64 * 1024;

    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self {
            root_path,
            chunk_size: Self::DEFAULT_CHUNK,
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn resolve(&self, uri: &str) -> PathBuf {
        self.root_path.join(relative_key(uri))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetReader for FileAssetReader {
    async fn read_bytes_with_progress(
        &self,
        uri: &str,
        progress: Progress<'_>,
    ) -> Result<Vec<u8>, AssetError> {
        use tokio::io::AsyncReadExt;

        let path = self.resolve(uri);
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let total = file.metadata().await?.len();

        let mut data = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let n = file.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            progress(data.len() as u64, total);
        }
        if total == 0 {
            progress(0, 0);
        }
        Ok(data)
    }
}

/// In-memory asset source, keyed by reference.
#[derive(Debug)]
pub struct MemoryAssetReader {
    files: RwLock<FxHashMap<String, Arc<[u8]>>>,
    chunk_size: usize,
}

impl Default for MemoryAssetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: RwLock::new(FxHashMap::default()),
            chunk_size: 4096,
        }
    }

    /// Size of the progress steps reported per read.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn insert(&self, uri: &str, bytes: impl Into<Arc<[u8]>>) {
        self.files
            .write()
            .insert(relative_key(uri).to_string(), bytes.into());
    }

    pub fn insert_text(&self, uri: &str, text: &str) {
        self.insert(uri, text.as_bytes());
    }

    pub fn remove(&self, uri: &str) -> bool {
        self.files.write().remove(relative_key(uri)).is_some()
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.files.read().contains_key(relative_key(uri))
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes_with_progress(
        &self,
        uri: &str,
        progress: Progress<'_>,
    ) -> Result<Vec<u8>, AssetError> {
        let bytes = self
            .files
            .read()
            .get(relative_key(uri))
            .cloned()
            .ok_or_else(|| AssetError::NotFound(uri.to_string()))?;

        let total = bytes.len() as u64;
        let mut data = Vec::with_capacity(bytes.len());
        let chunk_size = self.chunk_size.max(1);
        for chunk in bytes.chunks(chunk_size) {
            data.extend_from_slice(chunk);
            progress(data.len() as u64, total);
        }
        if bytes.is_empty() {
            progress(0, 0);
        }
        Ok(data)
    }
}

/// 资产读取器变体枚举
/// Static dispatch over the available readers.
#[derive(Clone)]
pub enum AssetReaderVariant {
    #[cfg(not(target_arch = "wasm32"))]
    File(Arc<FileAssetReader>),
    Memory(Arc<MemoryAssetReader>),
}

impl AssetReaderVariant {
    /// Creates a reader for a filesystem root.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_source(source: &str) -> Result<Self, AssetError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(AssetError::InvalidData(format!(
                "no network reader available for {source}"
            )));
        }
        Ok(Self::File(Arc::new(FileAssetReader::new(source))))
    }

    pub async fn read_bytes_with_progress(
        &self,
        uri: &str,
        progress: Progress<'_>,
    ) -> Result<Vec<u8>, AssetError> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(r) => r.read_bytes_with_progress(uri, progress).await,
            Self::Memory(r) => r.read_bytes_with_progress(uri, progress).await,
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        self.read_bytes_with_progress(uri, &no_progress).await
    }
}

impl From<Arc<MemoryAssetReader>> for AssetReaderVariant {
    fn from(reader: Arc<MemoryAssetReader>) -> Self {
        Self::Memory(reader)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<Arc<FileAssetReader>> for AssetReaderVariant {
    fn from(reader: Arc<FileAssetReader>) -> Self {
        Self::File(reader)
    }
}

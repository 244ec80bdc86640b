use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source} (place the file in the model directory instead)")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Locates model weights on disk, downloading them on first use.
///
/// Resolution order:
/// 1. Explicit model directory (operator-provided, e.g. `--model-dir`)
/// 2. Cache directory
/// 3. Download from URL into the cache directory
pub struct ModelResolver {
    cache_dir: PathBuf,
    model_dir: Option<PathBuf>,
    progress: Option<ProgressFn>,
}

impl ModelResolver {
    /// Resolver rooted at the platform cache directory.
    pub fn new(model_dir: Option<PathBuf>) -> Result<Self, ModelResolveError> {
        Ok(Self::with_cache_dir(model_cache_dir()?, model_dir))
    }

    pub fn with_cache_dir(cache_dir: PathBuf, model_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model_dir,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn resolve(&self, name: &str, url: &str) -> Result<PathBuf, ModelResolveError> {
        if let Some(dir) = &self.model_dir {
            let path = dir.join(name);
            if path.exists() {
                return Ok(path);
            }
        }

        let cached_path = self.cache_dir.join(name);
        if cached_path.exists() {
            return Ok(cached_path);
        }

        log::info!("Downloading {name} from {url}");
        fs::create_dir_all(&self.cache_dir).map_err(ModelResolveError::CacheDir)?;
        download(url, &cached_path, |downloaded, total| {
            if let Some(cb) = &self.progress {
                cb(name, downloaded, total);
            }
        })?;
        Ok(cached_path)
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/LostFound Redact/models/`
/// - Linux: `$XDG_CACHE_HOME/LostFound Redact/models/` or `~/.cache/LostFound Redact/models/`
/// - Windows: `%LOCALAPPDATA%/LostFound Redact/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("LostFound Redact").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("LostFound Redact").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(
    url: &str,
    dest: &Path,
    progress: impl Fn(u64, u64),
) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: impl Fn(u64, u64),
) -> Result<(), ModelResolveError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ModelResolveError::Write { path, source }
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(write_err(temp_path))?;

    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err(temp_path))?;
        downloaded += n as u64;
        progress(downloaded, total);
    }

    file.flush().map_err(write_err(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_model_dir() {
        let tmp = TempDir::new().unwrap();
        let model_dir = tmp.path().join("models");
        let cache_dir = tmp.path().join("cache");
        fs::create_dir_all(&model_dir).unwrap();
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(model_dir.join("face.onnx"), b"bundled").unwrap();
        fs::write(cache_dir.join("face.onnx"), b"cached").unwrap();

        let resolver = ModelResolver::with_cache_dir(cache_dir, Some(model_dir.clone()));
        let path = resolver
            .resolve("face.onnx", "http://invalid.nonexistent.example.com/face.onnx")
            .unwrap();
        assert_eq!(path, model_dir.join("face.onnx"));
    }

    #[test]
    fn test_resolve_falls_back_to_cache() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join("rec.onnx"), b"cached").unwrap();

        let resolver =
            ModelResolver::with_cache_dir(cache_dir.clone(), Some(tmp.path().join("missing")));
        let path = resolver
            .resolve("rec.onnx", "http://invalid.nonexistent.example.com/rec.onnx")
            .unwrap();
        assert_eq!(path, cache_dir.join("rec.onnx"));
    }

    #[test]
    fn test_resolve_download_failure_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let resolver = ModelResolver::with_cache_dir(cache_dir.clone(), None);

        let result = resolver.resolve("det.onnx", "http://invalid.nonexistent.example.com/det");
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        assert!(result.unwrap_err().to_string().contains("model directory"));
        assert!(!cache_dir.join("det.onnx").exists());
        assert!(!cache_dir.join("det.part").exists());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("LostFound Redact"));
        assert!(path.to_string_lossy().contains("models"));
    }
}

//! Media helpers for vision prompts — base64 image encoding and video frame sources.
//!
//! Video decoding is out of scope here: a [`FrameSource`] yields frames that
//! are already JPEG-encoded, either from a directory of pre-extracted files or
//! from memory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

/// Default spacing between frames kept from a directory of extracted frames.
pub const DEFAULT_FRAME_STRIDE: usize = 10;

/// Read an image file and return its base64 encoding.
pub async fn encode_image(path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Wrap a base64 JPEG payload in a `data:` URL.
pub fn image_data_url(b64: &str) -> String {
    format!("data:image/jpeg;base64,{}", b64)
}

/// Thin a frame sequence for summarization.
///
/// Keeps every `interval`-th frame. When that still leaves more than
/// `max_frames`, the full sequence is re-strided by `len / max_frames` instead.
pub fn select_frames(frames: Vec<String>, interval: usize, max_frames: usize) -> Vec<String> {
    let interval = interval.max(1);
    let picked = frames.iter().step_by(interval).count();

    let stride = if max_frames > 0 && picked > max_frames {
        (frames.len() / max_frames).max(1)
    } else {
        interval
    };

    frames.into_iter().step_by(stride).collect()
}

// ─────────────────────────────────────────────
// Frame sources
// ─────────────────────────────────────────────

/// A sequence of base64-encoded JPEG frames, in playback order.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn frames(&self) -> anyhow::Result<Vec<String>>;

    /// Short description for logging.
    fn describe(&self) -> String;
}

/// Frames already held in memory.
#[derive(Clone, Debug, Default)]
pub struct EncodedFrames(pub Vec<String>);

#[async_trait]
impl FrameSource for EncodedFrames {
    async fn frames(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory frames", self.0.len())
    }
}

/// Pre-extracted `*.jpg` / `*.jpeg` frames in a directory, ordered by file
/// name, keeping every `stride`-th file.
#[derive(Clone, Debug)]
pub struct DirectoryFrames {
    dir: PathBuf,
    stride: usize,
}

impl DirectoryFrames {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stride: DEFAULT_FRAME_STRIDE,
        }
    }

    /// Override the stride (minimum 1).
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn frame_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("failed to open frame directory {}", self.dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && is_jpeg(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for DirectoryFrames {
    async fn frames(&self) -> anyhow::Result<Vec<String>> {
        let paths = self.frame_paths().await?;
        debug!(
            dir = %self.dir.display(),
            files = paths.len(),
            stride = self.stride,
            "reading extracted frames"
        );

        let mut frames = Vec::new();
        for path in paths.iter().step_by(self.stride) {
            frames.push(encode_image(path).await?);
        }
        Ok(frames)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[tokio::test]
    async fn test_encode_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.jpg");
        std::fs::write(&path, b"hello").unwrap();

        let encoded = encode_image(&path).await.unwrap();
        assert_eq!(encoded, "aGVsbG8=");
        assert_eq!(image_data_url(&encoded), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_encode_missing_image_fails_with_path() {
        let err = encode_image(Path::new("/nonexistent/frame.jpg")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/frame.jpg"));
    }

    #[test]
    fn test_select_frames_by_interval() {
        let selected = select_frames(numbered(100), 30, 30);
        assert_eq!(selected, vec!["0", "30", "60", "90"]);
    }

    #[test]
    fn test_select_frames_restrides_long_sequences() {
        // 1000 / 10 = 100 picks exceeds the cap, so stride becomes 1000 / 30 = 33.
        let selected = select_frames(numbered(1000), 10, 30);
        assert_eq!(selected.len(), 31);
        assert_eq!(selected[1], "33");
    }

    #[test]
    fn test_select_frames_edge_cases() {
        assert!(select_frames(Vec::new(), 30, 30).is_empty());
        assert_eq!(select_frames(numbered(3), 0, 30).len(), 3);
    }

    #[tokio::test]
    async fn test_directory_frames_sorted_and_strided() {
        let dir = TempDir::new().unwrap();
        for i in 0..25 {
            std::fs::write(dir.path().join(format!("frame_{i:03}.jpg")), format!("f{i}")).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let frames = DirectoryFrames::new(dir.path()).frames().await.unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], STANDARD.encode("f0"));
        assert_eq!(frames[1], STANDARD.encode("f10"));
        assert_eq!(frames[2], STANDARD.encode("f20"));
    }

    #[tokio::test]
    async fn test_directory_frames_accepts_jpeg_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.JPEG"), "a").unwrap();
        std::fs::write(dir.path().join("b.jpg"), "b").unwrap();

        let frames = DirectoryFrames::new(dir.path()).with_stride(1).frames().await.unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[tokio::test]
    async fn test_directory_frames_missing_dir() {
        let source = DirectoryFrames::new("/nonexistent/frames");
        assert!(source.frames().await.is_err());
    }
}

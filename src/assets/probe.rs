/// Filesystem image probing
///
/// Walks a fallback chain against an asset root, reading only image
/// headers to learn natural dimensions. Decoding happens on tokio's
/// blocking pool so the UI thread never waits on disk.

use log::debug;
use std::future::Future;
use std::path::{Path, PathBuf};

use super::resolver::FallbackChain;

/// Natural pixel size of a loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// width / height, None for degenerate images
    pub fn aspect_ratio(self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

/// Anything that can walk a candidate list and load the first image
/// that works. `ImageState::Degraded` means every candidate failed.
pub trait ImageLoader {
    fn load(&self, candidates: Vec<String>) -> impl Future<Output = ImageState> + Send;
}

/// Load state of one image (grid cell or preview)
#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    /// Still walking the chain
    Pending,
    /// A candidate loaded
    Ready { path: PathBuf, dimensions: Dimensions },
    /// Chain exhausted, render at reduced opacity
    Degraded,
}

impl ImageState {
    pub fn dimensions(&self) -> Option<Dimensions> {
        match self {
            ImageState::Ready { dimensions, .. } => Some(*dimensions),
            _ => None,
        }
    }
}

/// Loads candidates relative to an asset root directory
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a candidate
    pub fn path_for(&self, candidate: &str) -> PathBuf {
        self.root.join(candidate)
    }

    /// Try each candidate in order until one loads
    pub async fn settle(&self, mut chain: FallbackChain) -> ImageState {
        while let Some(candidate) = chain.current() {
            let path = self.path_for(candidate);

            if let Some(dimensions) = probe_dimensions(path.clone()).await {
                debug!(
                    "resolved {} ({}x{}) after {} failed candidates",
                    path.display(),
                    dimensions.width,
                    dimensions.height,
                    chain.failures()
                );
                return ImageState::Ready { path, dimensions };
            }

            chain.advance();
        }

        debug!("all {} candidates failed, degrading", chain.len());
        ImageState::Degraded
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, candidates: Vec<String>) -> impl Future<Output = ImageState> + Send {
        let loader = self.clone();
        async move { loader.settle(FallbackChain::new(candidates)).await }
    }
}

/// Read an image header and return its size; any failure is `None`
pub async fn probe_dimensions(path: PathBuf) -> Option<Dimensions> {
    let result = tokio::task::spawn_blocking(move || image::image_dimensions(&path))
        .await
        .ok()?;

    let (width, height) = result.ok()?;
    Some(Dimensions::new(width, height))
}

/// Best-effort warm-up of the OS cache for upcoming images.
///
/// Yields first so visible work goes ahead, then reads the first
/// candidate of each list that exists. Errors are ignored.
/// Returns how many lists had a readable candidate.
pub async fn prefetch(loader: FsImageLoader, candidate_lists: Vec<Vec<String>>) -> usize {
    tokio::task::yield_now().await;

    let mut warmed = 0;
    for candidates in candidate_lists {
        for candidate in candidates {
            if tokio::fs::read(loader.path_for(&candidate)).await.is_ok() {
                warmed += 1;
                break;
            }
        }
    }

    debug!("prefetched {warmed} images");
    warmed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("photo-gallery-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("variants")).unwrap();
        dir
    }

    #[test]
    fn test_dimensions() {
        let dims = Dimensions::new(1200, 800);
        assert_eq!(dims.area(), 960_000);
        assert_eq!(dims.aspect_ratio(), Some(1.5));
        assert_eq!(Dimensions::new(0, 10).aspect_ratio(), None);
    }

    #[tokio::test]
    async fn test_settle_walks_fallback_chain() {
        let dir = scratch_dir("settle");
        image::RgbImage::new(6, 4)
            .save(dir.join("variants/pier_thumb-sm.png"))
            .unwrap();

        let loader = FsImageLoader::new(&dir);
        let chain = FallbackChain::new(vec![
            "variants/pier_thumb-sm.webp".into(),
            "variants/pier_thumb-sm.png".into(),
        ]);

        let image = loader.settle(chain).await;
        assert_eq!(
            image,
            ImageState::Ready {
                path: dir.join("variants/pier_thumb-sm.png"),
                dimensions: Dimensions::new(6, 4),
            }
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_exhausted_chain_degrades() {
        let loader = FsImageLoader::new("/nonexistent/assets");
        let chain = FallbackChain::new(vec!["a.webp".into(), "a.jpg".into()]);

        assert_eq!(loader.settle(chain).await, ImageState::Degraded);
        assert_eq!(loader.load(vec![]).await, ImageState::Degraded);
    }

    #[tokio::test]
    async fn test_prefetch_ignores_failures() {
        let dir = scratch_dir("prefetch");
        std::fs::write(dir.join("variants/a_thumb-sm.jpg"), b"not really a jpeg").unwrap();

        let loader = FsImageLoader::new(&dir);
        let warmed = prefetch(
            loader,
            vec![
                vec!["variants/a_thumb-sm.webp".into(), "variants/a_thumb-sm.jpg".into()],
                vec!["variants/missing.webp".into()],
            ],
        )
        .await;

        assert_eq!(warmed, 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

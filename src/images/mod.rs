/*!
 * Best-effort illustrative images for flashcards.
 *
 * Each card's first candidate translation is used as a search query. Found
 * images are downloaded, shrunk to fit a bounding box and written as JPEG
 * files next to the deck; a card's `<img>` tags reference those files by name.
 * Nothing here may abort a run: failures are reported through
 * `EnrichmentOutcome::Skipped`.
 */

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ImageError;
use crate::flashcards::Flashcard;

pub mod google;

pub use self::google::{GoogleImageSearch, HttpImageFetcher};

/// Largest result page the search API returns
pub const MAX_SEARCH_RESULTS: usize = 10;

/// JPEG quality of saved images
const JPEG_QUALITY: u8 = 85;

/// Image search capability
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Return up to `num` candidate image URLs for `query`
    async fn search(&self, query: &str, num: usize) -> Result<Vec<String>, ImageError>;
}

/// Image download capability
#[async_trait]
pub trait ImageFetch: Send + Sync {
    /// Download the raw bytes behind `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError>;
}

/// Images written for one card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSet {
    /// Files on disk, in tag order
    pub files: Vec<PathBuf>,
    /// Concatenated `<img src='…'>` tags
    pub tags: String,
}

/// Result of an enrichment attempt
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Images were attached to the cards; `files` must be removed after packaging
    Enriched { files: Vec<PathBuf> },
    /// Enrichment did not run or failed as a whole
    Skipped { reason: String },
}

impl EnrichmentOutcome {
    /// Files written during enrichment
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Enriched { files } => files,
            Self::Skipped { .. } => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Bounding box images are shrunk into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBox {
    pub width: u32,
    pub height: u32,
}

impl ImageBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Searches, downloads and stores images for flashcards
pub struct ImageEnricher {
    search: Arc<dyn ImageSearch>,
    fetcher: Arc<dyn ImageFetch>,
}

impl ImageEnricher {
    pub fn new(search: Arc<dyn ImageSearch>, fetcher: Arc<dyn ImageFetch>) -> Self {
        Self { search, fetcher }
    }

    /// Attach images to every card, absorbing any failure.
    ///
    /// Cards keep their order; each one receives the set found for its own
    /// query.
    pub async fn enrich(
        &self,
        cards: &mut [Flashcard],
        out_dir: &Path,
        per_query: usize,
        image_box: ImageBox,
    ) -> EnrichmentOutcome {
        let queries: Vec<String> = cards.iter().map(|card| card.image_query().to_string()).collect();

        match self.fetch_image_sets(&queries, out_dir, per_query, image_box).await {
            Ok(sets) => {
                let mut files = Vec::new();
                for (card, set) in cards.iter_mut().zip(sets) {
                    files.extend(set.files.iter().cloned());
                    card.images = Some(set);
                }
                info!("Attached {} image(s) to {} flashcard(s)", files.len(), cards.len());
                EnrichmentOutcome::Enriched { files }
            }
            Err(e) => {
                warn!("Proceeding without images: {}", e);
                EnrichmentOutcome::Skipped { reason: e.to_string() }
            }
        }
    }

    /// Fetch, resize and save images for each query, one set per query.
    ///
    /// Individual downloads that fail are skipped. A failing search fails the
    /// whole call, and files already written are removed.
    pub async fn fetch_image_sets<S: AsRef<str>>(
        &self,
        queries: &[S],
        out_dir: &Path,
        per_query: usize,
        image_box: ImageBox,
    ) -> Result<Vec<ImageSet>, ImageError> {
        if per_query == 0 {
            return Err(ImageError::InvalidArgument("images per query must be > 0".to_string()));
        }

        let mut sets = Vec::with_capacity(queries.len());
        for query in queries {
            match self.fetch_image_set(query.as_ref(), out_dir, per_query, image_box).await {
                Ok(set) => sets.push(set),
                Err(e) => {
                    let written: Vec<PathBuf> = sets.iter().flat_map(|set: &ImageSet| set.files.clone()).collect();
                    remove_files(&written);
                    return Err(e);
                }
            }
        }
        Ok(sets)
    }

    async fn fetch_image_set(
        &self,
        query: &str,
        out_dir: &Path,
        per_query: usize,
        image_box: ImageBox,
    ) -> Result<ImageSet, ImageError> {
        let urls = self.search.search(query, MAX_SEARCH_RESULTS).await?;
        let images = self.fetch_images(&urls, per_query).await?;

        let mut set = ImageSet::default();
        for img in images {
            let resized = resize_image(&img, image_box);
            let filename = generate_filename(query);
            let path = out_dir.join(&filename);
            if let Err(e) = save_jpeg(&resized, &path) {
                remove_files(&set.files);
                return Err(e);
            }
            set.files.push(path);
            set.tags.push_str(&image_tag(&filename));
        }

        debug!("Saved {} image(s) for '{}'", set.files.len(), query);
        Ok(set)
    }

    /// Download and decode up to `n` images, skipping any that fail
    pub async fn fetch_images(&self, urls: &[String], n: usize) -> Result<Vec<DynamicImage>, ImageError> {
        if n == 0 {
            return Err(ImageError::InvalidArgument("n must be > 0".to_string()));
        }

        let mut images = Vec::new();
        for url in urls {
            if images.len() >= n {
                break;
            }

            let decoded = match self.fetcher.fetch(url).await {
                Ok(bytes) => image::load_from_memory(&bytes).map_err(|e| ImageError::Decode(e.to_string())),
                Err(e) => Err(e),
            };

            match decoded {
                Ok(img) => images.push(DynamicImage::ImageRgb8(img.to_rgb8())),
                Err(e) => debug!("Failed to fetch image {}: {}", url, e),
            }
        }
        Ok(images)
    }
}

/// Dimensions of an image shrunk to fit `image_box`, keeping its aspect ratio.
///
/// Images that already fit are never enlarged.
pub fn fit_within(width: u32, height: u32, image_box: ImageBox) -> (u32, u32) {
    if width <= image_box.width && height <= image_box.height {
        return (width, height);
    }

    let scale = f64::min(
        image_box.width as f64 / width as f64,
        image_box.height as f64 / height as f64,
    );
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// A resized copy of `img` fitting within `image_box`
pub fn resize_image(img: &DynamicImage, image_box: ImageBox) -> DynamicImage {
    let (width, height) = fit_within(img.width(), img.height(), image_box);
    if (width, height) == (img.width(), img.height()) {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Write `img` as a JPEG file, creating parent directories
pub fn save_jpeg(img: &DynamicImage, path: &Path) -> Result<(), ImageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode_image(&img.to_rgb8())
        .map_err(|e| ImageError::Decode(e.to_string()))
}

/// Unique file name derived from the first term of `query`
pub fn generate_filename(query: &str) -> String {
    let name: String = query
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let name = if name.is_empty() { "image".to_string() } else { name };
    format!("{}-{}.jpg", name, Uuid::new_v4().simple())
}

/// Inline image tag referencing a media file by name
pub fn image_tag(filename: &str) -> String {
    format!("<img src='{}'>", filename)
}

/// Delete files from disk, ignoring ones already gone
pub fn remove_files(files: &[PathBuf]) {
    for file in files {
        if file.exists() {
            if let Err(e) = fs::remove_file(file) {
                warn!("Failed to delete {}: {}", file.display(), e);
            }
        }
    }
}

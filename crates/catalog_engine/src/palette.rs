use std::collections::HashMap;

use catalog_core::Rgb;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no opaque pixels")]
    NoOpaquePixels,
}

/// Derives a single background color from encoded image bytes.
pub trait ColorExtractor: Send + Sync {
    fn dominant_color(&self, image: &[u8]) -> Result<Rgb, PaletteError>;
}

/// Picks the most populated 15-bit color bucket and returns its mean color.
#[derive(Debug, Clone)]
pub struct HistogramColorExtractor {
    /// Images larger than this (either side) are downsampled first.
    max_dimension: u32,
}

impl Default for HistogramColorExtractor {
    fn default() -> Self {
        Self { max_dimension: 112 }
    }
}

impl HistogramColorExtractor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }
}

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl ColorExtractor for HistogramColorExtractor {
    fn dominant_color(&self, bytes: &[u8]) -> Result<Rgb, PaletteError> {
        let mut image = image::load_from_memory(bytes)?;
        if image.width() > self.max_dimension || image.height() > self.max_dimension {
            image = image.thumbnail(self.max_dimension, self.max_dimension);
        }

        let mut buckets: HashMap<u16, Bucket> = HashMap::new();
        for pixel in image.to_rgba8().pixels() {
            let [r, g, b, a] = pixel.0;
            if a < 128 {
                continue;
            }
            let key = (u16::from(r >> 3) << 10) | (u16::from(g >> 3) << 5) | u16::from(b >> 3);
            let bucket = buckets.entry(key).or_default();
            bucket.count += 1;
            bucket.r += u64::from(r);
            bucket.g += u64::from(g);
            bucket.b += u64::from(b);
        }

        // Ties go to the lower key so the result does not depend on map order.
        let (_, bucket) = buckets
            .into_iter()
            .max_by(|(ka, a), (kb, b)| a.count.cmp(&b.count).then(kb.cmp(ka)))
            .ok_or(PaletteError::NoOpaquePixels)?;

        let mean = |sum: u64| (sum / bucket.count) as u8;
        Ok(Rgb::new(mean(bucket.r), mean(bucket.g), mean(bucket.b)))
    }
}

// src/stages/image.rs

use tracing::trace;

use crate::config::ImagesSection;
use crate::errors::{PipelineError, Result};
use crate::stages::{jpeg, Asset, Stage, SvgMinifier};

/// Lossless image optimizer. Picks the codec from the file extension;
/// formats it does not know (including WebP) pass through untouched.
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    png_level: u8,
    strip_jpeg_metadata: bool,
    svg: SvgMinifier,
}

impl ImageOptimizer {
    pub fn new(png_level: u8, strip_jpeg_metadata: bool) -> Self {
        Self {
            png_level: png_level.min(6),
            strip_jpeg_metadata,
            svg: SvgMinifier::new(),
        }
    }

    pub fn from_config(images: &ImagesSection) -> Self {
        Self::new(images.png_level, images.strip_jpeg_metadata)
    }

    fn optimize_png(&self, data: &[u8]) -> std::result::Result<Vec<u8>, String> {
        let options = oxipng::Options::from_preset(self.png_level);
        oxipng::optimize_from_memory(data, &options).map_err(|e| e.to_string())
    }
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::from_config(&ImagesSection::default())
    }
}

impl Stage for ImageOptimizer {
    fn name(&self) -> &'static str {
        "imagemin"
    }

    fn apply(&self, asset: Asset) -> Result<Asset> {
        let before = asset.contents.len();
        let optimized = match asset.extension().as_str() {
            "png" => Some(self.optimize_png(&asset.contents)),
            "jpg" | "jpeg" if self.strip_jpeg_metadata => {
                Some(jpeg::strip_metadata(&asset.contents))
            }
            "svg" => Some(self.svg.minify(&asset.contents)),
            _ => None,
        };

        let Some(result) = optimized else {
            return Ok(asset);
        };
        let contents = result.map_err(|e| PipelineError::stage(self.name(), &asset.relative, e))?;

        // Never hand back something larger than the input.
        let contents = if contents.len() <= before {
            contents
        } else {
            asset.contents
        };
        trace!(
            path = %asset.relative.display(),
            before,
            after = contents.len(),
            "optimized image"
        );
        Ok(Asset {
            relative: asset.relative,
            contents,
        })
    }
}

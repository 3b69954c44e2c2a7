use std::borrow::Cow;
use std::path::Path;

use anyhow::Context as _;

use crate::Color;

/// CPU-side RGBA8 pixel buffer.
///
/// Decoded images and rendered text land here first; a [`crate::Texture`] is
/// then created from it. An optional colour key marks one RGB value as fully
/// transparent when the pixels are handed to the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    has_alpha: bool,
    color_key: Option<Color>,
}

impl Surface {
    /// Decodes an image file (PNG, JPEG, BMP).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to load image {}", path.display()))?;
        let has_alpha = img.color().has_alpha();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!(
            "loaded {} ({}x{}, alpha: {})",
            path.display(),
            width,
            height,
            has_alpha
        );
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
            has_alpha,
            color_key: None,
        })
    }

    /// Wraps raw RGBA8 pixels (4 bytes per pixel, tightly packed).
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> anyhow::Result<Self> {
        let expected = rgba_len(width, height)?;
        if rgba.len() != expected {
            anyhow::bail!(
                "invalid rgba length: got {}, expected {}",
                rgba.len(),
                expected
            );
        }
        Ok(Self {
            width,
            height,
            pixels: rgba,
            has_alpha: true,
            color_key: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn color_key(&self) -> Option<Color> {
        self.color_key
    }

    /// Sets (or with `None`, clears) the transparent colour. Alpha of the key is ignored.
    pub fn set_color_key(&mut self, key: Option<Color>) -> &mut Self {
        self.color_key = key;
        self
    }

    /// Consuming variant of [`Surface::set_color_key`] for one-shot construction.
    pub fn with_color_key(mut self, key: Color) -> Self {
        self.color_key = Some(key);
        self
    }

    /// Whether a texture made from this surface should alpha-blend by default.
    pub(crate) fn wants_blending(&self) -> bool {
        self.has_alpha || self.color_key.is_some()
    }

    /// Pixels as uploaded to the GPU, with the colour key applied.
    pub(crate) fn keyed_pixels(&self) -> Cow<'_, [u8]> {
        let Some(key) = self.color_key else {
            return Cow::Borrowed(&self.pixels);
        };
        let mut out = self.pixels.clone();
        for px in out.chunks_exact_mut(4) {
            if key.same_rgb(px) {
                px[3] = 0;
            }
        }
        Cow::Owned(out)
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> anyhow::Result<usize> {
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(4))
        .map(|v| v as usize)
        .ok_or_else(|| anyhow::anyhow!("invalid surface size {width}x{height}"))
}

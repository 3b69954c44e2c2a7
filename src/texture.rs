use std::path::Path;

use crate::platform::with_graphics;
use crate::{Rect, Surface};

/// Layout of raw pixel data passed to [`Texture::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 bytes per pixel: R, G, B.
    Rgb24,
    /// 3 bytes per pixel: B, G, R.
    Bgr24,
    /// 4 bytes per pixel: R, G, B, A.
    Rgba32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            PixelFormat::Rgba32 => 4,
        }
    }
}

/// How a texture is combined with what is already on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Overwrite the destination.
    #[default]
    None,
    /// Standard alpha blending.
    Blend,
}

/// Handle to a GPU texture.
///
/// Blend mode and colour/alpha modulation live on the handle and are captured
/// each time the texture is copied, so changing them between two copies in
/// the same frame affects only the later copy. Dropping the handle releases
/// the GPU texture once the current frame has been presented.
#[derive(Debug)]
pub struct Texture {
    pub(crate) id: u32,
    width: u32,
    height: u32,
    format: PixelFormat,
    blend_mode: BlendMode,
    color_mod: [u8; 3],
    alpha_mod: u8,
}

impl Texture {
    /// Loads an image file straight into a texture.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::from_surface(&Surface::load(path)?)
    }

    /// Uploads a surface. Surfaces with an alpha channel or colour key blend by default.
    pub fn from_surface(surface: &Surface) -> anyhow::Result<Self> {
        let (w, h) = (surface.width(), surface.height());
        let pixels = surface.keyed_pixels();
        let id = with_graphics(|g| g.create_texture(w, h, &pixels))??;
        let mut texture = Self::with_id(id, w, h, PixelFormat::Rgba32);
        if surface.wants_blending() {
            texture.blend_mode = BlendMode::Blend;
        }
        Ok(texture)
    }

    /// Creates a blank texture whose contents are supplied later via [`Texture::update`].
    pub fn new_static(format: PixelFormat, width: u32, height: u32) -> anyhow::Result<Self> {
        let zeros = vec![0u8; crate::surface::rgba_len(width, height)?];
        let id = with_graphics(|g| g.create_texture(width, height, &zeros))??;
        Ok(Self::with_id(id, width, height, format))
    }

    fn with_id(id: u32, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            id,
            width,
            height,
            format,
            blend_mode: BlendMode::None,
            color_mod: [255, 255, 255],
            alpha_mod: 255,
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(id: u32, width: u32, height: u32) -> Self {
        Self::with_id(id, width, height, PixelFormat::Rgba32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    /// Replaces the pixels of `rect` (the whole texture for `None`).
    ///
    /// `pixels` are in this texture's [`PixelFormat`], `pitch` bytes per row.
    pub fn update(
        &mut self,
        rect: Option<Rect>,
        pixels: &[u8],
        pitch: usize,
    ) -> anyhow::Result<&mut Self> {
        let bounds = self.bounds();
        let target = rect.unwrap_or(bounds);
        if bounds.intersection(&target) != Some(target) {
            anyhow::bail!("update rect {target:?} is outside texture bounds {bounds:?}");
        }
        let rgba = expand_to_rgba(
            self.format,
            pixels,
            target.w as usize,
            target.h as usize,
            pitch,
        )?;
        with_graphics(|g| g.write_texture(self.id, target, &rgba))??;
        Ok(self)
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    pub fn color_mod(&self) -> [u8; 3] {
        self.color_mod
    }

    /// Multiplies sampled colour by `(r, g, b) / 255` when copied.
    pub fn set_color_mod(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.color_mod = [r, g, b];
        self
    }

    pub fn alpha_mod(&self) -> u8 {
        self.alpha_mod
    }

    /// Multiplies sampled alpha by `alpha / 255` when copied with [`BlendMode::Blend`].
    pub fn set_alpha_mod(&mut self, alpha: u8) -> &mut Self {
        self.alpha_mod = alpha;
        self
    }

    pub(crate) fn tint(&self) -> [f32; 4] {
        let [r, g, b] = self.color_mod;
        let a = match self.blend_mode {
            BlendMode::Blend => self.alpha_mod,
            BlendMode::None => 255,
        };
        crate::Color::new(r, g, b, a).to_f32()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        // Outside a running app there is no renderer to release into.
        let _ = with_graphics(|g| g.release_texture(self.id));
    }
}

/// Converts `width` x `height` pixels of `format` laid out with `pitch` bytes
/// per row into tightly packed RGBA8.
pub(crate) fn expand_to_rgba(
    format: PixelFormat,
    pixels: &[u8],
    width: usize,
    height: usize,
    pitch: usize,
) -> anyhow::Result<Vec<u8>> {
    let bpp = format.bytes_per_pixel();
    let row_bytes = width * bpp;
    if pitch < row_bytes {
        anyhow::bail!("pitch {pitch} is smaller than a row of {width} pixels ({row_bytes} bytes)");
    }
    if height > 0 {
        let needed = pitch * (height - 1) + row_bytes;
        if pixels.len() < needed {
            anyhow::bail!(
                "pixel buffer too short: got {} bytes, need {}",
                pixels.len(),
                needed
            );
        }
    }

    let mut out = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let line = &pixels[row * pitch..row * pitch + row_bytes];
        for px in line.chunks_exact(bpp) {
            match format {
                PixelFormat::Rgb24 => out.extend_from_slice(&[px[0], px[1], px[2], 255]),
                PixelFormat::Bgr24 => out.extend_from_slice(&[px[2], px[1], px[0], 255]),
                PixelFormat::Rgba32 => out.extend_from_slice(px),
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_rows_gain_opaque_alpha() {
        // 1x3 column, pitch equal to one pixel
        let out = expand_to_rgba(PixelFormat::Rgb24, &[9, 9, 9, 5, 5, 5, 0, 0, 0], 1, 3, 3).unwrap();
        assert_eq!(out, vec![9, 9, 9, 255, 5, 5, 5, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn bgr_is_swizzled() {
        let out = expand_to_rgba(PixelFormat::Bgr24, &[1, 2, 3], 1, 1, 3).unwrap();
        assert_eq!(out, vec![3, 2, 1, 255]);
    }

    #[test]
    fn padded_pitch_skips_row_padding() {
        let data = [1, 1, 1, 1, 0xEE, 0xEE, 2, 2, 2, 2];
        let out = expand_to_rgba(PixelFormat::Rgba32, &data, 1, 2, 6).unwrap();
        assert_eq!(out, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn short_buffers_and_pitches_are_errors() {
        assert!(expand_to_rgba(PixelFormat::Rgb24, &[0; 5], 2, 1, 6).is_err());
        assert!(expand_to_rgba(PixelFormat::Rgb24, &[0; 12], 2, 2, 5).is_err());
    }

    #[test]
    fn gradient_generation_matches_lesson() {
        let grad: Vec<u8> = (0..256 * 3).map(|n| 255 - (n / 3) as u8).collect();
        let out = expand_to_rgba(PixelFormat::Bgr24, &grad, 1, 256, 3).unwrap();
        assert_eq!(&out[..4], &[255, 255, 255, 255]);
        assert_eq!(&out[out.len() - 4..], &[0, 0, 0, 255]);
    }

    #[test]
    fn modulation_is_captured_in_tint() {
        let mut t = Texture::detached(7, 4, 4);
        t.set_color_mod(0, 255, 255).set_alpha_mod(85);
        // alpha modulation only applies when blending
        assert_eq!(t.tint(), [0.0, 1.0, 1.0, 1.0]);
        t.set_blend_mode(BlendMode::Blend);
        assert_eq!(t.tint()[3], 85.0 / 255.0);
        assert_eq!(t.bounds(), Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn update_outside_bounds_is_rejected_before_upload() {
        let mut t = Texture::detached(1, 4, 4);
        let err = t.update(Some(Rect::new(2, 2, 4, 4)), &[0; 64], 16).unwrap_err();
        assert!(err.to_string().contains("outside texture bounds"));
    }
}

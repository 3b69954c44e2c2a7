use std::path::Path;

use ab_glyph::{Font as _, FontArc, Glyph, PxScale, ScaleFont as _};
use anyhow::Context as _;

use crate::{Color, Surface};

/// A TrueType/OpenType font opened at a fixed point size.
#[derive(Clone)]
pub struct Font {
    font: FontArc,
    scale: PxScale,
    point_size: u32,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("point_size", &self.point_size)
            .field("px_scale", &self.scale.y)
            .finish()
    }
}

struct Layout {
    glyphs: Vec<Glyph>,
    width: u32,
    height: u32,
}

impl Font {
    pub fn open(path: impl AsRef<Path>, point_size: u32) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to load font {}", path.display()))?;
        Self::from_bytes(bytes, point_size)
            .with_context(|| format!("failed to parse font {}", path.display()))
    }

    pub fn from_bytes(bytes: Vec<u8>, point_size: u32) -> anyhow::Result<Self> {
        if point_size == 0 {
            anyhow::bail!("font point size must be positive");
        }
        let font = FontArc::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("{e}"))?;
        // One point per pixel, i.e. 72 dpi.
        let scale = font
            .pt_to_px_scale(point_size as f32)
            .ok_or_else(|| anyhow::anyhow!("font has no units-per-em"))?;
        Ok(Self {
            font,
            scale,
            point_size,
        })
    }

    pub fn point_size(&self) -> u32 {
        self.point_size
    }

    /// Height of a rendered line in pixels.
    pub fn height(&self) -> u32 {
        let scaled = self.font.as_scaled(self.scale);
        (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32
    }

    /// Size the text would occupy once rendered, in pixels.
    pub fn size_text(&self, text: &str) -> (u32, u32) {
        let layout = self.layout(text);
        (layout.width, layout.height)
    }

    /// Renders a single line of anti-aliased text into a new transparent surface.
    pub fn render_blended(&self, text: &str, color: Color) -> anyhow::Result<Surface> {
        let layout = self.layout(text);
        if layout.width == 0 {
            anyhow::bail!("text has zero width");
        }

        let (w, h) = (layout.width, layout.height);
        let mut rgba = vec![0u8; crate::surface::rgba_len(w, h)?];
        for px in rgba.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }

        let scaled = self.font.as_scaled(self.scale);
        for glyph in layout.glyphs {
            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (ox, oy) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|x, y, coverage| {
                let px = ox + x as i32;
                let py = oy + y as i32;
                if px < 0 || py < 0 || px >= w as i32 || py >= h as i32 {
                    return;
                }
                let idx = ((py as u32 * w + px as u32) * 4 + 3) as usize;
                let a = (coverage * color.a as f32).round().clamp(0.0, 255.0) as u8;
                rgba[idx] = rgba[idx].saturating_add(a);
            });
        }

        Surface::from_rgba8(w, h, rgba)
    }

    fn layout(&self, text: &str) -> Layout {
        let scaled = self.font.as_scaled(self.scale);
        let ascent = scaled.ascent();
        let mut caret = 0.0f32;
        let mut last = None;
        let mut glyphs = Vec::with_capacity(text.len());

        for ch in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, ab_glyph::point(caret, ascent)));
            caret += scaled.h_advance(id);
            last = Some(id);
        }

        let width = if glyphs.is_empty() {
            0
        } else {
            caret.ceil().max(1.0) as u32
        };
        Layout {
            glyphs,
            width,
            height: self.height(),
        }
    }
}

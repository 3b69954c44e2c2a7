use crate::sprite_batch::SpriteInstance;
use crate::{BlendMode, Flip, Point, Rect};

/// A recorded texture copy, ready to be batched by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DrawCommand {
    pub texture: u32,
    pub blend: BlendMode,
    pub instance: SpriteInstance,
}

/// Everything needed to turn one copy request into a quad.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CopyRequest {
    pub texture_size: (u32, u32),
    pub src: Option<Rect>,
    pub dst: Rect,
    pub angle_degrees: f64,
    pub center: Option<Point>,
    pub flip: Flip,
    pub tint: [f32; 4],
}

impl CopyRequest {
    /// Clips the source region to the texture and builds the quad.
    ///
    /// When clipping shrinks the source, the destination shrinks with it so the
    /// visible part keeps its on-screen placement and scale. Returns `None` for
    /// copies that cannot produce any pixels.
    pub(crate) fn resolve(&self) -> Option<SpriteInstance> {
        let (tw, th) = self.texture_size;
        if tw == 0 || th == 0 || self.dst.is_empty() {
            return None;
        }
        let bounds = Rect::sized(tw, th);
        let src = self.src.unwrap_or(bounds);
        let clipped = src.intersection(&bounds)?;

        let sx = self.dst.w as f32 / src.w as f32;
        let sy = self.dst.h as f32 / src.h as f32;
        let dst = [
            self.dst.x as f32 + (clipped.x - src.x) as f32 * sx,
            self.dst.y as f32 + (clipped.y - src.y) as f32 * sy,
            clipped.w as f32 * sx,
            clipped.h as f32 * sy,
        ];

        let (tw, th) = (tw as f32, th as f32);
        let mut uv = [
            clipped.x as f32 / tw,
            clipped.y as f32 / th,
            clipped.w as f32 / tw,
            clipped.h as f32 / th,
        ];
        if self.flip.horizontal() {
            uv[0] += uv[2];
            uv[2] = -uv[2];
        }
        if self.flip.vertical() {
            uv[1] += uv[3];
            uv[3] = -uv[3];
        }

        let center = match self.center {
            Some(c) => [c.x as f32, c.y as f32],
            None => [dst[2] / 2.0, dst[3] / 2.0],
        };

        Some(SpriteInstance {
            dst,
            uv,
            tint: self.tint,
            transform: [self.angle_degrees.to_radians() as f32, center[0], center[1], 0.0],
        })
    }
}

impl DrawCommand {
    pub(crate) fn is_rotated(&self) -> bool {
        self.instance.transform[0] != 0.0
    }

    /// Axis-aligned destination, ignoring rotation.
    pub(crate) fn dst_rect(&self) -> [f32; 4] {
        self.instance.dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    fn request(src: Option<Rect>, dst: Rect, flip: Flip) -> CopyRequest {
        CopyRequest {
            texture_size: (400, 200),
            src,
            dst,
            angle_degrees: 0.0,
            center: None,
            flip,
            tint: OPAQUE,
        }
    }

    #[test]
    fn sprite_cell_maps_to_uv() {
        let inst = request(
            Some(Rect::new(8, 11, 50, 50)),
            Rect::new(0, 190, 50, 50),
            Flip::None,
        )
        .resolve()
        .unwrap();
        assert_eq!(inst.dst, [0.0, 190.0, 50.0, 50.0]);
        assert_eq!(inst.uv, [8.0 / 400.0, 11.0 / 200.0, 50.0 / 400.0, 50.0 / 200.0]);
        assert_eq!(inst.transform, [0.0, 25.0, 25.0, 0.0]);
    }

    #[test]
    fn vertical_flip_swaps_v_edges() {
        let inst = request(
            Some(Rect::new(0, 0, 400, 100)),
            Rect::new(0, 0, 10, 10),
            Flip::Vertical,
        )
        .resolve()
        .unwrap();
        assert_eq!(inst.uv, [0.0, 0.5, 1.0, -0.5]);
    }

    #[test]
    fn both_flip_swaps_both_axes() {
        let inst = request(None, Rect::new(0, 0, 10, 10), Flip::Both).resolve().unwrap();
        assert_eq!(inst.uv, [1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn out_of_texture_source_is_clipped_with_destination() {
        // half the source hangs off the right edge of the texture
        let inst = request(
            Some(Rect::new(380, 0, 40, 20)),
            Rect::new(100, 100, 80, 40),
            Flip::None,
        )
        .resolve()
        .unwrap();
        assert_eq!(inst.dst, [100.0, 100.0, 40.0, 40.0]);
        assert_eq!(inst.uv[2], 20.0 / 400.0);
    }

    #[test]
    fn degenerate_copies_resolve_to_nothing() {
        assert!(request(Some(Rect::new(500, 0, 10, 10)), Rect::new(0, 0, 10, 10), Flip::None)
            .resolve()
            .is_none());
        assert!(request(None, Rect::new(0, 0, 0, 10), Flip::None).resolve().is_none());
    }

    #[test]
    fn rotation_is_converted_to_radians() {
        let mut req = request(None, Rect::new(0, 0, 10, 10), Flip::None);
        req.angle_degrees = 180.0;
        req.center = Some(Point::new(0, 0));
        let inst = req.resolve().unwrap();
        assert!((inst.transform[0] - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(&inst.transform[1..3], &[0.0, 0.0]);
    }
}

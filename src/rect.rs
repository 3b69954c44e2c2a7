/// A point in output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle, origin at the top-left corner.
///
/// Used both for source regions inside a texture and destination regions on
/// the output. A rectangle with a non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle at the origin covering `width` x `height`.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_dim(width), clamp_dim(height))
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = Rect::new(x, y, right - x, bottom - y);
        if r.is_empty() { None } else { Some(r) }
    }

    pub fn has_intersection(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }
}

fn clamp_dim(v: u32) -> i32 {
    v.min(i32::MAX as u32) as i32
}

/// Mirroring applied when copying a texture region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub(crate) fn horizontal(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    pub(crate) fn vertical(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_clips_to_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 80, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 80, 50, 20)));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersection(&b), None);
        assert!(!a.has_intersection(&b));
    }

    #[test]
    fn empty_rects() {
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 10, -1).is_empty());
        assert_eq!(Rect::new(0, 0, 0, 0).intersection(&Rect::new(0, 0, 5, 5)), None);
    }

    #[test]
    fn center_and_edges() {
        let r = Rect::new(10, 20, 50, 40);
        assert_eq!(r.right(), 60);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.center(), Point::new(35, 40));
    }
}

//! Rectangle arithmetic and ICCCM size-hint normalization (§4.5, ICCCM
//! 4.1.2.3). Grounded on the `Dimensions`/`Quad` style kept by
//! `MarcusGrass-pgwm`'s `geometry` module, reworked around plain `i32`
//! client/monitor coordinates the way dwm itself represents geometry.

use x11::xlib::XSizeHints;

/// An axis-aligned rectangle in root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Area of the intersection of `self` and `other`, zero if disjoint.
    /// Used by `recttomon` to find the monitor a rectangle mostly overlaps.
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let ix = (self.x + self.w).min(other.x + other.w) - self.x.max(other.x);
        let iy = (self.y + self.h).min(other.y + other.h) - self.y.max(other.y);
        if ix <= 0 || iy <= 0 {
            0
        } else {
            i64::from(ix) * i64::from(iy)
        }
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Clamp `self` so it lies entirely within `bounds` (used both for
    /// floating-window centering corrections and for `applysizehints`'s
    /// work-area clamp).
    pub fn clamp_into(&mut self, bounds: &Rect) {
        if self.x > bounds.x + bounds.w {
            self.x = bounds.x + bounds.w - self.w;
        }
        if self.y > bounds.y + bounds.h {
            self.y = bounds.y + bounds.h - self.h;
        }
        if self.x + self.w < bounds.x {
            self.x = bounds.x;
        }
        if self.y + self.h < bounds.y {
            self.y = bounds.y;
        }
    }
}

/// Normalized ICCCM size hints, read from `WM_NORMAL_HINTS`. Absent fields
/// fall back to dwm's own defaults (base = min, no aspect constraint, 1px
/// increments).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    pub base_w: i32,
    pub base_h: i32,
    pub min_w: i32,
    pub min_h: i32,
    pub max_w: i32,
    pub max_h: i32,
    pub inc_w: i32,
    pub inc_h: i32,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for SizeHints {
    fn default() -> Self {
        SizeHints {
            base_w: 0,
            base_h: 0,
            min_w: 0,
            min_h: 0,
            max_w: 0,
            max_h: 0,
            inc_w: 0,
            inc_h: 0,
            min_aspect: 0.0,
            max_aspect: 0.0,
        }
    }
}

impl SizeHints {
    /// `fixed` iff min == max and both are set, i.e. the client never wants
    /// to be resized (dwm: `c->isfixed`).
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }

    /// Translate a raw `XSizeHints` (as read by `XGetWMNormalHints`) into
    /// our normalized form, matching dwm's `updatesizehints`.
    pub fn from_raw(hints: &XSizeHints, base_w_fallback: i32, base_h_fallback: i32) -> Self {
        use x11::xlib::{PAspect, PBaseSize, PMaxSize, PMinSize, PResizeInc};

        let mut s = SizeHints::default();

        if hints.flags & PBaseSize != 0 {
            s.base_w = hints.base_width;
            s.base_h = hints.base_height;
        } else if hints.flags & PMinSize != 0 {
            s.base_w = hints.min_width;
            s.base_h = hints.min_height;
        } else {
            s.base_w = base_w_fallback;
            s.base_h = base_h_fallback;
        }

        if hints.flags & PResizeInc != 0 {
            s.inc_w = hints.width_inc;
            s.inc_h = hints.height_inc;
        }

        if hints.flags & PMaxSize != 0 {
            s.max_w = hints.max_width;
            s.max_h = hints.max_height;
        }

        if hints.flags & PMinSize != 0 {
            s.min_w = hints.min_width;
            s.min_h = hints.min_height;
        } else if hints.flags & PBaseSize != 0 {
            s.min_w = hints.base_width;
            s.min_h = hints.base_height;
        }

        if hints.flags & PAspect != 0 && hints.min_aspect.y != 0 && hints.max_aspect.x != 0 {
            s.min_aspect = f64::from(hints.min_aspect.x) / f64::from(hints.min_aspect.y);
            s.max_aspect = f64::from(hints.max_aspect.x) / f64::from(hints.max_aspect.y);
        }

        s
    }
}

/// §4.5: clamp into bounds, then (if `resize_hints` or floating) apply
/// aspect ratio, increment rounding, base-size and min/max. Mirrors dwm's
/// `applysizehints`, in the same order.
///
/// `interact` widens the clamp bounds to the full screen instead of the
/// work area (used for interactive move/resize, which may legally cross
/// into the bar band).
pub fn apply_size_hints(
    mut r: Rect,
    hints: &SizeHints,
    bar_height: i32,
    bounds_work: &Rect,
    bounds_screen: &Rect,
    interact: bool,
    resize_hints: bool,
    floating: bool,
) -> Rect {
    // Minimum possible: at least 1px, and never thinner than the bar so a
    // shrunk window doesn't vanish behind it.
    r.w = r.w.max(1);
    r.h = r.h.max(1).max(bar_height);

    let bounds = if interact { bounds_screen } else { bounds_work };
    if r.x > bounds.x + bounds.w {
        r.x = bounds.x + bounds.w - r.w;
    }
    if r.y > bounds.y + bounds.h {
        r.y = bounds.y + bounds.h - r.h;
    }
    if r.x + r.w < bounds.x {
        r.x = bounds.x;
    }
    if r.y + r.h < bounds.y {
        r.y = bounds.y;
    }

    if resize_hints || floating {
        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 {
            let aspect = f64::from(r.w) / f64::from(r.h);
            if hints.max_aspect < hints.min_aspect {
                // degenerate hint, ignore
            } else if aspect < hints.min_aspect {
                r.h = (f64::from(r.w) / hints.min_aspect) as i32;
            } else if aspect > hints.max_aspect {
                r.w = (f64::from(r.h) * hints.max_aspect) as i32;
            }
        }
        if hints.inc_w > 0 {
            let base = if hints.base_w > 0 { hints.base_w } else { hints.min_w };
            r.w -= base;
            r.w -= r.w % hints.inc_w;
            r.w += base;
        }
        if hints.inc_h > 0 {
            let base = if hints.base_h > 0 { hints.base_h } else { hints.min_h };
            r.h -= base;
            r.h -= r.h % hints.inc_h;
            r.h += base;
        }
        r.w = r.w.max(hints.min_w.max(1));
        r.h = r.h.max(hints.min_h.max(1));
        if hints.max_w > 0 {
            r.w = r.w.min(hints.max_w);
        }
        if hints.max_h > 0 {
            r.h = r.h.min(hints.max_h);
        }
    }

    r.w = r.w.max(1);
    r.h = r.h.max(1);
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_area_disjoint_is_zero() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(200, 200, 50, 50);
        assert_eq!(a.intersection_area(&b), 0);
    }

    #[test]
    fn intersection_area_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection_area(&b), 50 * 50);
    }

    #[test]
    fn apply_size_hints_floors_to_one_pixel() {
        let hints = SizeHints::default();
        let bounds = Rect::new(0, 0, 1920, 1080);
        let r = Rect::new(0, 0, -5, -5);
        let out = apply_size_hints(r, &hints, 0, &bounds, &bounds, false, false, false);
        assert!(out.w >= 1);
        assert!(out.h >= 1);
    }

    #[test]
    fn apply_size_hints_respects_increment() {
        let mut hints = SizeHints::default();
        hints.base_w = 10;
        hints.base_h = 10;
        hints.inc_w = 10;
        hints.inc_h = 10;
        hints.min_w = 10;
        hints.min_h = 10;
        let bounds = Rect::new(0, 0, 1920, 1080);
        let r = Rect::new(0, 0, 57, 57);
        let out = apply_size_hints(r, &hints, 0, &bounds, &bounds, false, true, false);
        assert_eq!((out.w - hints.base_w) % hints.inc_w, 0);
        assert_eq!((out.h - hints.base_h) % hints.inc_h, 0);
    }

    #[test]
    fn apply_size_hints_clamps_to_min_max() {
        let mut hints = SizeHints::default();
        hints.min_w = 200;
        hints.min_h = 200;
        hints.max_w = 400;
        hints.max_h = 400;
        let bounds = Rect::new(0, 0, 1920, 1080);
        let huge = apply_size_hints(
            Rect::new(0, 0, 5000, 5000),
            &hints,
            0,
            &bounds,
            &bounds,
            false,
            true,
            false,
        );
        assert_eq!(huge.w, 400);
        assert_eq!(huge.h, 400);
        let tiny = apply_size_hints(
            Rect::new(0, 0, 1, 1),
            &hints,
            0,
            &bounds,
            &bounds,
            false,
            true,
            false,
        );
        assert_eq!(tiny.w, 200);
        assert_eq!(tiny.h, 200);
    }
}

//! Beam geometry: slot spacing, slot centres, and the snap catchment zone
//!
//! Everything is recomputed from the measured beam width on demand so it
//! always reflects the current layout (resizes included).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Client-space bounding box (left/top/right/bottom in px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.left + self.width() / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.top + self.height() / 2.0)
    }

    /// Grow the box by independent margins (horizontal on both sides)
    pub fn expanded(&self, horizontal: f32, top: f32, bottom: f32) -> Self {
        Self {
            left: self.left - horizontal,
            top: self.top - top,
            right: self.right + horizontal,
            bottom: self.bottom + bottom,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Which side of the pivot a slot lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Center,
    Right,
}

impl Side {
    pub fn of(position: i32) -> Self {
        match position {
            p if p < 0 => Side::Left,
            p if p > 0 => Side::Right,
            _ => Side::Center,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Center => "Centre",
            Side::Right => "Right",
        }
    }
}

/// Pixel distance between adjacent slots
pub fn spacing(beam_width: f32) -> f32 {
    (beam_width - 2.0 * SCALE_INSET_PX).max(0.0) / SLOT_INTERVALS
}

/// Horizontal centre of a slot, relative to the beam's left edge
pub fn slot_center_px(slot: i32, beam_width: f32) -> f32 {
    beam_width / 2.0 + slot as f32 * spacing(beam_width)
}

/// Offset of a slot from the beam centre (for `calc(50% + Npx)` placement)
pub fn slot_offset_px(slot: i32, beam_width: f32) -> f32 {
    slot as f32 * spacing(beam_width)
}

/// Region in which a released drag counts as a placement attempt.
///
/// Generous below the beam: touch drags tend to overshoot downwards.
pub fn catchment_zone(beam: &Rect) -> Rect {
    beam.expanded(CATCH_MARGIN_X, CATCH_MARGIN_TOP, CATCH_MARGIN_BOTTOM)
}

/// Nearest logical slot for a horizontal client position, clamped to the scale
pub fn nearest_slot(center_x: f32, beam: &Rect) -> i32 {
    let spacing = spacing(beam.width());
    if spacing <= 0.0 {
        return 0;
    }
    // f32::round rounds half away from zero: 2.5 -> 3, -2.5 -> -3
    let slot = ((center_x - beam.center_x()) / spacing).round();
    (slot as i32).clamp(-MAX_SLOT, MAX_SLOT)
}

/// Every slot on the scale, left to right
pub fn slots() -> impl Iterator<Item = i32> {
    -MAX_SLOT..=MAX_SLOT
}

/// A tick on the beam scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleMark {
    pub slot: i32,
    pub left_px: f32,
    /// Distance label, shown on even slots only
    pub label: Option<u32>,
}

pub fn scale_marks(beam_width: f32) -> Vec<ScaleMark> {
    slots()
        .map(|slot| ScaleMark {
            slot,
            left_px: slot_center_px(slot, beam_width),
            label: (slot % 2 == 0).then(|| slot.unsigned_abs()),
        })
        .collect()
}

/// Drop-zone marker positions (highlighted while a drag is active)
pub fn drop_zones(beam_width: f32) -> Vec<(i32, f32)> {
    slots()
        .map(|slot| (slot, slot_center_px(slot, beam_width)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> Rect {
        // 560 px wide: usable 480, spacing 20
        Rect::new(100.0, 300.0, 560.0, 20.0)
    }

    #[test]
    fn test_spacing() {
        assert_eq!(spacing(560.0), 20.0);
        assert_eq!(spacing(80.0), 0.0);
        assert_eq!(spacing(10.0), 0.0);
    }

    #[test]
    fn test_slot_center() {
        assert_eq!(slot_center_px(0, 560.0), 280.0);
        assert_eq!(slot_center_px(-12, 560.0), 40.0);
        assert_eq!(slot_center_px(12, 560.0), 520.0);
    }

    #[test]
    fn test_nearest_slot_half_rounds_up() {
        let b = beam();
        // 2.5 slot widths right of centre
        assert_eq!(nearest_slot(b.center_x() + 50.0, &b), 3);
        assert_eq!(nearest_slot(b.center_x() - 50.0, &b), -3);
        assert_eq!(nearest_slot(b.center_x() + 49.0, &b), 2);
    }

    #[test]
    fn test_nearest_slot_clamps() {
        let b = beam();
        assert_eq!(nearest_slot(b.center_x() + 1000.0, &b), 12);
        assert_eq!(nearest_slot(b.center_x() - 1000.0, &b), -12);
    }

    #[test]
    fn test_nearest_slot_zero_spacing() {
        let b = Rect::new(0.0, 0.0, 50.0, 10.0);
        assert_eq!(nearest_slot(500.0, &b), 0);
    }

    #[test]
    fn test_catchment_zone_margins() {
        let zone = catchment_zone(&beam());
        assert_eq!(zone.left, 60.0);
        assert_eq!(zone.right, 700.0);
        assert_eq!(zone.top, 140.0);
        assert_eq!(zone.bottom, 560.0);
        assert!(zone.contains(Vec2::new(60.0, 560.0)));
        assert!(!zone.contains(Vec2::new(59.9, 400.0)));
        assert!(!zone.contains(Vec2::new(300.0, 139.0)));
    }

    #[test]
    fn test_scale_marks() {
        let marks = scale_marks(560.0);
        assert_eq!(marks.len(), 25);
        assert_eq!(marks[0].slot, -12);
        assert_eq!(marks[0].label, Some(12));
        assert_eq!(marks[1].label, None);
        assert_eq!(marks[12].left_px, 280.0);
        assert_eq!(drop_zones(560.0).len(), 25);
    }

    #[test]
    fn test_side_of() {
        assert_eq!(Side::of(-1), Side::Left);
        assert_eq!(Side::of(0), Side::Center);
        assert_eq!(Side::of(7), Side::Right);
    }
}

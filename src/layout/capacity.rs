use crate::model::{CapacityUtilization, QuarterKey, Rgb};

use super::QuarterMarker;

/// Colour of a 0% segment.
pub const CAPACITY_LIGHT: Rgb = Rgb::new(0xE3, 0xF2, 0xFD);
/// Colour of a 100% segment.
pub const CAPACITY_DARK: Rgb = Rgb::new(0x0D, 0x47, 0xA1);

/// One quarter-wide cell of the capacity strip.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacitySegment {
    pub key: QuarterKey,
    pub label: String,
    pub x: f64,
    pub width: f64,
    pub percentage: u8,
    pub color: Rgb,
}

impl CapacitySegment {
    /// The part of the segment inside the window as `(x, width)`.
    pub fn clipped(&self) -> Option<(f64, f64)> {
        let left = self.x.max(0.0);
        let right = (self.x + self.width).min(1.0);
        (right > left).then_some((left, right - left))
    }

    pub fn label_color(&self) -> Rgb {
        if self.color.luminance() > 0.55 {
            Rgb::new(0x21, 0x21, 0x21)
        } else {
            Rgb::WHITE
        }
    }
}

pub fn capacity_color(percentage: u8) -> Rgb {
    CAPACITY_LIGHT.lerp(CAPACITY_DARK, percentage.min(100) as f32 / 100.0)
}

/// Resolve the capacity document against the quarter markers of a layout.
pub fn capacity_segments(
    quarters: &[QuarterMarker],
    capacity: &CapacityUtilization,
) -> Vec<CapacitySegment> {
    quarters
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let next_x = quarters.get(i + 1).map(|next| next.x).unwrap_or(1.0);
            let percentage = capacity.percentage_for(marker.key);
            CapacitySegment {
                key: marker.key,
                label: marker.label.clone(),
                x: marker.x,
                width: next_x - marker.x,
                percentage,
                color: capacity_color(percentage),
            }
        })
        .collect()
}

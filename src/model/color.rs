/// An opaque RGB colour, independent of any drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Relative luminance in `0.0..=1.0`, used to pick a readable label colour.
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_upper_case_with_hash() {
        assert_eq!(Rgb::new(0x15, 0x65, 0xC0).to_hex(), "#1565C0");
        assert_eq!(Rgb::BLACK.to_hex(), "#000000");
    }

    #[test]
    fn lerp_hits_both_stops() {
        let light = Rgb::new(200, 230, 255);
        let dark = Rgb::new(10, 60, 120);
        assert_eq!(light.lerp(dark, 0.0), light);
        assert_eq!(light.lerp(dark, 1.0), dark);
        assert_eq!(light.lerp(dark, 7.0), dark);
        assert_eq!(light.lerp(dark, f32::NAN), light);
    }
}

use palette::{FromColor, Hsl, IntoColor, Srgb};

use crate::data::model::Outcome;

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

/// An sRGB colour, shared by the chart specs and the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// CSS hex notation, e.g. `#0000ff`.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn to_srgb(self) -> Srgb {
        Srgb::new(self.0, self.1, self.2).into_format()
    }

    fn from_srgb(rgb: Srgb) -> Self {
        Rgb(
            (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
            (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
            (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

/// Outcome 0 is blue, outcome 1 is red, in every view.
pub fn outcome_color(outcome: Outcome) -> Rgb {
    match outcome {
        Outcome::Healthy => Rgb::BLUE,
        Outcome::Disease => Rgb::RED,
    }
}

/// Colour of the lowess overlay.
pub const TREND_COLOR: Rgb = Rgb::BLACK;

// ---------------------------------------------------------------------------
// Shades: one hue, `n` lightness steps
// ---------------------------------------------------------------------------

/// Generates `n` shades of `base`, keeping its hue and spreading lightness
/// between 35% and 75%. Used for the outer ring of the sunburst so children
/// stay recognisably in their parent's colour.
pub fn shades(base: Rgb, n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    let hsl = Hsl::from_color(base.to_srgb());
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
            let shade = Hsl::new(hsl.hue, hsl.saturation, 0.35 + 0.4 * t);
            let rgb: Srgb = shade.into_color();
            Rgb::from_srgb(rgb)
        })
        .collect()
}

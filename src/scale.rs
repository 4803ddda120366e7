use ratatui::style::Color;

/// Fill for units outside the selected country
pub const NOT_APPLICABLE: Color = Color::Rgb(0xf0, 0xf0, 0xf0);
/// Fill for sentinel, unparseable or out-of-domain values
pub const NO_DATA: Color = Color::Rgb(0xcc, 0xcc, 0xcc);
/// Fill for an exact zero on the non-primary datasets
pub const ZERO: Color = Color::Rgb(0xff, 0xff, 0xff);

type Rgb = (u8, u8, u8);

// Nine-class ColorBrewer sequential schemes, light to dark
const YL_OR_RD: [Rgb; 9] = [
    (0xff, 0xff, 0xcc), (0xff, 0xed, 0xa0), (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c), (0xfd, 0x8d, 0x3c), (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c), (0xbd, 0x00, 0x26), (0x80, 0x00, 0x26),
];
const GREENS: [Rgb; 9] = [
    (0xf7, 0xfc, 0xf5), (0xe5, 0xf5, 0xe0), (0xc7, 0xe9, 0xc0),
    (0xa1, 0xd9, 0x9b), (0x74, 0xc4, 0x76), (0x41, 0xab, 0x5d),
    (0x23, 0x8b, 0x45), (0x00, 0x6d, 0x2c), (0x00, 0x44, 0x1b),
];
const PURPLES: [Rgb; 9] = [
    (0xfc, 0xfb, 0xfd), (0xef, 0xed, 0xf5), (0xda, 0xda, 0xeb),
    (0xbc, 0xbd, 0xdc), (0x9e, 0x9a, 0xc8), (0x80, 0x7d, 0xba),
    (0x6a, 0x51, 0xa3), (0x54, 0x27, 0x8f), (0x3f, 0x00, 0x7d),
];
const ORANGES: [Rgb; 9] = [
    (0xff, 0xf5, 0xeb), (0xfe, 0xe6, 0xce), (0xfd, 0xd0, 0xa2),
    (0xfd, 0xae, 0x6b), (0xfd, 0x8d, 0x3c), (0xf1, 0x69, 0x13),
    (0xd9, 0x48, 0x01), (0xa6, 0x36, 0x03), (0x7f, 0x27, 0x04),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ramp {
    YlOrRd,
    Greens,
    Purples,
    Oranges,
}

impl Ramp {
    fn stops(self) -> &'static [Rgb; 9] {
        match self {
            Ramp::YlOrRd => &YL_OR_RD,
            Ramp::Greens => &GREENS,
            Ramp::Purples => &PURPLES,
            Ramp::Oranges => &ORANGES,
        }
    }

    /// Piecewise-linear interpolation across the stops, `t` clamped to [0, 1]
    pub fn sample(self, t: f64) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        lerp_rgb(stops[i], stops[i + 1], pos - i as f64)
    }
}

/// Sequential color scale over a fixed domain. Inputs outside the domain are
/// clamped to its ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    ramp: Ramp,
    domain: (f64, f64),
    sqrt: bool,
}

impl ColorScale {
    pub const fn linear(ramp: Ramp, domain: (f64, f64)) -> Self {
        Self { ramp, domain, sqrt: false }
    }

    pub const fn sqrt(ramp: Ramp, domain: (f64, f64)) -> Self {
        Self { ramp, domain, sqrt: true }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn color(&self, value: f64) -> Color {
        let (lo, hi) = self.domain;
        let t = if self.sqrt {
            let (lo, hi) = (signed_sqrt(lo), signed_sqrt(hi));
            (signed_sqrt(value) - lo) / (hi - lo)
        } else {
            (value - lo) / (hi - lo)
        };
        self.ramp.sample(t)
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Color {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Blend two colors. Non-RGB colors snap to `to` once `t` reaches 1.
pub fn lerp_color(from: Color, to: Color, t: f64) -> Color {
    match (from, to) {
        (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) => {
            lerp_rgb((r0, g0, b0), (r1, g1, b1), t.clamp(0.0, 1.0))
        }
        _ if t >= 1.0 => to,
        _ => from,
    }
}

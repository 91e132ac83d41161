use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Named gradients
// ---------------------------------------------------------------------------

/// Anchor colours at evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (0x44, 0x01, 0x54),
    (0x3b, 0x52, 0x8b),
    (0x21, 0x91, 0x8c),
    (0x5e, 0xc9, 0x62),
    (0xfd, 0xe7, 0x25),
];

const COOLWARM: [(u8, u8, u8); 5] = [
    (0x3b, 0x4c, 0xc0),
    (0x7c, 0x9f, 0xf9),
    (0xdd, 0xdd, 0xdd),
    (0xf6, 0x9c, 0x7b),
    (0xb4, 0x04, 0x26),
];

/// Colour at position `t` in `[0, 1]` of a gradient, mixed in linear RGB.
fn gradient_at(anchors: &[(u8, u8, u8)], t: f32) -> Srgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let segments = (anchors.len() - 1) as f32;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - idx as f32;

    let to_linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = to_linear(anchors[idx]).mix(to_linear(anchors[idx + 1]), frac);
    Srgb::from_linear(mixed)
}

/// `n` colours sampled from a gradient, skipping both ends the way a
/// categorical bar palette does.
fn sample(anchors: &[(u8, u8, u8)], n: usize) -> Vec<Srgb<u8>> {
    (0..n)
        .map(|i| gradient_at(anchors, (i + 1) as f32 / (n + 1) as f32))
        .collect()
}

pub fn viridis(n: usize) -> Vec<Srgb<u8>> {
    sample(&VIRIDIS, n)
}

pub fn coolwarm(n: usize) -> Vec<Srgb<u8>> {
    sample(&COOLWARM, n)
}

/// Viridis at an arbitrary position, for continuous colouring.
pub fn viridis_at(t: f32) -> Srgb<u8> {
    gradient_at(&VIRIDIS, t)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn to_rgb(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(c: Srgb<u8>, (r, g, b): (u8, u8, u8)) -> bool {
        c.red.abs_diff(r) <= 1 && c.green.abs_diff(g) <= 1 && c.blue.abs_diff(b) <= 1
    }

    #[test]
    fn test_palette_sizes() {
        assert!(viridis(0).is_empty());
        assert_eq!(viridis(15).len(), 15);
        assert_eq!(coolwarm(3).len(), 3);
    }

    #[test]
    fn test_single_colour_is_midpoint() {
        assert!(close(viridis(1)[0], VIRIDIS[2]));
    }

    #[test]
    fn test_gradient_endpoints() {
        assert!(close(viridis_at(0.0), VIRIDIS[0]));
        assert!(close(viridis_at(1.0), VIRIDIS[4]));
    }

    #[test]
    fn test_coolwarm_runs_blue_to_red() {
        let colours = coolwarm(5);
        assert!(colours[0].blue > colours[0].red);
        assert!(colours[4].red > colours[4].blue);
    }
}

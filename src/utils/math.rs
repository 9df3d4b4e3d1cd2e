use std::ops::{Add, Mul};

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: Mul<f32, Output = T> + Add<T, Output = T> + Copy,
{
    a * (1.0 - t) + b * t
}

/// Converts HSL (all components in `[0, 1]`, hue wrapping) to sRGB-encoded RGB.
/// No gamma decoding is applied.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    [
        hue_to_rgb(q, p, h + 1.0 / 3.0),
        hue_to_rgb(q, p, h),
        hue_to_rgb(q, p, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn hsl_grey_ignores_hue() {
        assert!(close(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]));
    }

    #[test]
    fn hsl_mid_saturation() {
        // h = 0, s = l = 0.5 -> (0.75, 0.25, 0.25)
        assert!(close(hsl_to_rgb(0.0, 0.5, 0.5), [0.75, 0.25, 0.25]));
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0_f32, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0_f32, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0_f32, 4.0, 0.5), 3.0);
    }
}

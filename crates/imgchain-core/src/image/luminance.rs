use super::Canvas;

/// ITU-R BT.601 luma weights, as specified: Y = 0.299R + 0.587G + 0.114B.
pub const LUMA_WEIGHTS: (f64, f64, f64) = (0.299, 0.587, 0.114);

pub fn luminance(canvas: &Canvas) -> Vec<f64> {
    let (wr, wg, wb) = LUMA_WEIGHTS;
    let n = (canvas.width as usize) * (canvas.height as usize);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let base = i * 4;
        let r = canvas.pixels[base] as f64;
        let g = canvas.pixels[base + 1] as f64;
        let b = canvas.pixels[base + 2] as f64;
        out.push(wr * r + wg * g + wb * b);
    }
    out
}

/// Shift a pixel's luminance by `delta` while keeping it achromatic: each
/// channel moves by `delta * weight`, clamped to [0,255]. This is the rule
/// the DCT layer uses after it changes a luminance coefficient, so the
/// resulting color drift is minimized.
pub fn apply_luma_delta(rgb: [u8; 3], delta: f64) -> [u8; 3] {
    let (wr, wg, wb) = LUMA_WEIGHTS;
    let adjust = |channel: u8, weight: f64| -> u8 {
        let v = channel as f64 + delta * weight;
        v.round().clamp(0.0, 255.0) as u8
    };
    [adjust(rgb[0], wr), adjust(rgb[1], wg), adjust(rgb[2], wb)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_formula_matches_spec() {
        let (wr, wg, wb) = LUMA_WEIGHTS;
        let mut c = Canvas::new(1, 1);
        c.set_rgb(0, 0, [100, 150, 200]);
        let y = luminance(&c)[0];
        assert!((y - (wr * 100.0 + wg * 150.0 + wb * 200.0)).abs() < 1e-9);
    }

    #[test]
    fn positive_delta_increases_all_channels_when_room() {
        let out = apply_luma_delta([100, 100, 100], 10.0);
        assert!(out[0] >= 100 && out[1] >= 100 && out[2] >= 100);
    }

    #[test]
    fn clamps_at_boundaries() {
        let out = apply_luma_delta([250, 250, 250], 100.0);
        assert_eq!(out, [255, 255, 255]);
        let out_low = apply_luma_delta([5, 5, 5], -100.0);
        assert_eq!(out_low, [0, 0, 0]);
    }
}

//! Ethnic skin tone blending.
//!
//! Blends three fixed skin tones by the ethnic triple. The tones are tuned
//! to look right when multiplied onto the base caucasian skin texture.

use crate::factors::{EthnicTag, Factors};

/// Blends the three ethnic base tones into one RGB color.
#[derive(Debug, Clone)]
pub struct EthnicSkinBlender {
    caucasian: [f64; 3],
    african: [f64; 3],
    asian: [f64; 3],
}

impl Default for EthnicSkinBlender {
    fn default() -> Self {
        Self {
            caucasian: hsl_to_rgb(0.062, 0.51, 0.68),
            african: hsl_to_rgb(0.09, 0.83, 0.21),
            asian: hsl_to_rgb(0.078, 0.34, 0.576),
        }
    }
}

impl EthnicSkinBlender {
    /// Creates the blender with the stock tone set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The blended skin tone for the given factors, each channel clamped to
    /// [0, 1].
    pub fn tone(&self, factors: &Factors) -> [f32; 3] {
        let caucasian = factors.ethnic(EthnicTag::Caucasian);
        let african = factors.ethnic(EthnicTag::African);
        let asian = factors.ethnic(EthnicTag::Asian);

        let mut color = [0.0f32; 3];
        for channel in 0..3 {
            let value = self.caucasian[channel] * caucasian
                + self.african[channel] * african
                + self.asian[channel] * asian;
            color[channel] = value.clamp(0.0, 1.0) as f32;
        }
        color
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Standard HSL to RGB conversion, all components in [0, 1].
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

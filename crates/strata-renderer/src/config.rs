// Tunables for batching and live blur. Deserialized from the settings file,
// every field falls back to its default when missing.

use serde::{Deserialize, Serialize};

/// Blur radii above this many passes are treated as unbounded.
const MAX_BOUNDED_BLUR_PASSES: u32 = 10;
const UNBOUNDED_BLUR_RADIUS: f32 = 32768.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Flush a batch as soon as it holds `max_batch_size` entries.
    pub auto_flush: bool,
    pub max_batch_size: usize,
    /// Route rect batches through the batched or instanced renderers.
    pub optimized_rects: bool,
    /// Prefer instancing over CPU vertex batching when the device has it.
    pub instancing: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            auto_flush: true,
            max_batch_size: 1000,
            optimized_rects: true,
            instancing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub enabled: bool,
    /// Kernel size, clamped to 1..=40 when computing radii.
    pub size: i32,
    pub passes: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 8,
            passes: 1,
        }
    }
}

impl BlurConfig {
    /// Pixel reach of one blur pass chain: `size * 2^passes`.
    pub fn one_blur_radius(&self) -> f32 {
        if self.passes > MAX_BOUNDED_BLUR_PASSES {
            return UNBOUNDED_BLUR_RADIUS;
        }
        self.size.clamp(1, 40) as f32 * 2f32.powi(self.passes as i32)
    }

    /// Distance a blurred pixel may sample from, used to keep the area
    /// under live-blur surfaces from being treated as occluded.
    pub fn sampling_radius(&self) -> f32 {
        self.one_blur_radius() * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_doubles_per_pass() {
        let blur = BlurConfig { enabled: true, size: 8, passes: 2 };
        assert_eq!(blur.one_blur_radius(), 32.0);
        assert_eq!(blur.sampling_radius(), 64.0);
    }

    #[test]
    fn size_is_clamped() {
        let tiny = BlurConfig { enabled: true, size: -3, passes: 0 };
        assert_eq!(tiny.one_blur_radius(), 1.0);
        let huge = BlurConfig { enabled: true, size: 500, passes: 1 };
        assert_eq!(huge.one_blur_radius(), 80.0);
    }

    #[test]
    fn many_passes_are_unbounded() {
        let blur = BlurConfig { enabled: true, size: 8, passes: 11 };
        assert_eq!(blur.one_blur_radius(), 32768.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: BatchConfig = serde_json::from_str(r#"{ "max_batch_size": 64 }"#).unwrap();
        assert_eq!(config.max_batch_size, 64);
        assert!(config.auto_flush);
        assert!(config.instancing);
    }
}

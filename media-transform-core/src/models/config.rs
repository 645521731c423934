/// Number of surfaces allocated per device binding.
pub const SURFACE_POOL_SIZE: usize = 4;

/// Configuration for a transform instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfiguration {
    /// Surfaces allocated per pool (default: 4).
    pub surface_pool_size: usize,

    /// Audio sample rates accepted on the input stream (default: 44100, 48000).
    pub supported_sample_rates: Vec<u32>,

    /// Largest accepted frame width in pixels (default: 4096).
    pub max_frame_width: u32,

    /// Largest accepted frame height in pixels (default: 2304).
    pub max_frame_height: u32,
}

impl TransformConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.surface_pool_size == 0 {
            return Err("surface pool size must be positive".into());
        }
        if self.supported_sample_rates.is_empty() {
            return Err("at least one sample rate must be supported".into());
        }
        if let Some(rate) = self.supported_sample_rates.iter().find(|r| **r == 0) {
            return Err(format!("unsupported sample rate: {}", rate));
        }
        if self.max_frame_width == 0 || self.max_frame_height == 0 {
            return Err(format!(
                "invalid maximum frame size: {}x{}",
                self.max_frame_width, self.max_frame_height
            ));
        }
        Ok(())
    }
}

impl Default for TransformConfiguration {
    fn default() -> Self {
        Self {
            surface_pool_size: SURFACE_POOL_SIZE,
            supported_sample_rates: vec![44100, 48000],
            max_frame_width: 4096,
            max_frame_height: 2304,
        }
    }
}

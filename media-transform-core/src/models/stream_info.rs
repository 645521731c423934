/// Minimum and maximum number of input and output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLimits {
    pub input_minimum: u32,
    pub input_maximum: u32,
    pub output_minimum: u32,
    pub output_maximum: u32,
}

/// Current number of input and output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCount {
    pub inputs: u32,
    pub outputs: u32,
}

/// Buffer requirements of one stream under its current media type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamInfo {
    /// Bytes per sample; 0 when no type is set.
    pub sample_size: usize,
    /// Every sample has the same size (video frames, audio block).
    pub fixed_sample_size: bool,
    /// The transform allocates output samples itself.
    pub provides_samples: bool,
    /// Required alignment of sample buffers, in bytes.
    pub alignment: usize,
}

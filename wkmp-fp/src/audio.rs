//! Decoded audio held in memory for fingerprinting

/// Interleaved 16-bit PCM audio
///
/// Produced by an [`AudioSource`](crate::loader::AudioSource) and owned by the
/// driver for the duration of one file's processing.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioData {
    /// Wrap interleaved samples
    ///
    /// Trailing samples that do not form a complete frame are dropped.
    pub fn new(mut samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        if channels > 0 {
            let complete = samples.len() - samples.len() % channels as usize;
            samples.truncate(complete);
        }
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Duration in whole seconds (truncated)
    pub fn duration_secs(&self) -> u32 {
        (self.duration_ms() / 1000) as u32
    }

    /// Average all channels into a single mono channel
    pub fn downmix_to_mono(&self) -> AudioData {
        if self.channels <= 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let mono = self
            .samples
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect();
        AudioData::new(mono, self.sample_rate, 1)
    }
}

//! Multi-channel audio buses with fixed capacity.
//!
//! An [`AudioBus`] is allocated once, at topology build time, with room for the
//! maximum channel count. The render thread changes its active channel count
//! between quanta without touching the allocator.

/// Planar multi-channel buffer of one quantum.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBus {
    samples: Vec<f32>,
    channel_count: usize,
    channel_capacity: usize,
    frames: usize,
}

impl AudioBus {
    /// Creates a zeroed bus with `channel_count` active channels and room for
    /// `channel_capacity`.
    pub fn new(channel_count: usize, frames: usize, channel_capacity: usize) -> Self {
        let channel_capacity = channel_capacity.max(channel_count).max(1);
        Self {
            samples: vec![0.0; channel_capacity * frames],
            channel_count: channel_count.min(channel_capacity),
            channel_capacity,
            frames,
        }
    }

    /// Returns the number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Returns the maximum number of channels.
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Returns the number of frames per channel.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Sets the active channel count, saturating at capacity. Never allocates.
    pub fn set_channel_count(&mut self, channel_count: usize) -> usize {
        self.channel_count = channel_count.min(self.channel_capacity);
        self.channel_count
    }

    /// Returns one active channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        (index < self.channel_count).then(|| &self.samples[index * self.frames..(index + 1) * self.frames])
    }

    /// Returns one active channel mutably.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        if index >= self.channel_count {
            return None;
        }
        let frames = self.frames;
        Some(&mut self.samples[index * frames..(index + 1) * frames])
    }

    /// Zeroes the active channels.
    pub fn clear(&mut self) {
        self.samples[..self.channel_count * self.frames].fill(0.0);
    }

    /// Adds `other` channel by channel over the channels both have.
    pub fn accumulate_from(&mut self, other: &AudioBus) {
        let frames = self.frames.min(other.frames);
        for ch in 0..self.channel_count.min(other.channel_count) {
            let dst = &mut self.samples[ch * self.frames..ch * self.frames + frames];
            let src = &other.samples[ch * other.frames..ch * other.frames + frames];
            for (d, s) in dst.iter_mut().zip(src) {
                *d += *s;
            }
        }
    }
}

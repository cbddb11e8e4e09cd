//! Channel values of one DMX universe

/// Largest universe Art-Net can carry in one ArtDmx packet
pub const MAX_UNIVERSE_SIZE: usize = 512;

/// The channel values of a single universe.
///
/// Channels are 1-indexed like on a lighting desk; storage is 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create an all-zero universe with `size` channels (clamped to 1..=512)
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size.clamp(1, MAX_UNIVERSE_SIZE)],
        }
    }

    /// Set a channel value. Writes outside the universe are dropped.
    pub fn set(&mut self, channel: u16, value: u8) {
        let index = (channel as usize).wrapping_sub(1);
        match self.data.get_mut(index) {
            Some(slot) => *slot = value,
            None => tracing::trace!("Ignoring write to channel {} outside universe", channel),
        }
    }

    /// Read a channel value, `None` outside the universe
    pub fn get(&self, channel: u16) -> Option<u8> {
        self.data.get((channel as usize).wrapping_sub(1)).copied()
    }

    /// Number of channels in the universe
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(MAX_UNIVERSE_SIZE)
    }
}

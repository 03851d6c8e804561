/*
 * Edge Events
 *
 * An edge event is one observed level transition, tagged with the
 * microsecond timestamp taken in the interrupt handler.
 *
 * Wire format (what `read` hands back in event mode):
 *
 *   offset  size  field
 *   0       8     timestamp_us, u64 little-endian
 *   8       1     level, 0 or 1
 *
 * Records are packed back to back with no padding.
 */

/// Size in bytes of one encoded event record
pub const EVENT_RECORD_SIZE: usize = 9;

/// Logical level of a GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Level {
    /// Logical low / 0
    #[default]
    Low = 0,
    /// Logical high / 1
    High = 1,
}

impl Level {
    /// Level from a raw hardware bit; only bit 0 is considered
    #[inline]
    pub const fn from_bit(bit: u32) -> Self {
        if bit & 1 != 0 { Level::High } else { Level::Low }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// A recorded level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeEvent {
    /// Monotonic clock reading in microseconds
    pub timestamp_us: u64,
    /// Pin level sampled right after the edge
    pub level: Level,
}

impl EdgeEvent {
    pub const fn new(timestamp_us: u64, level: Level) -> Self {
        Self {
            timestamp_us,
            level,
        }
    }

    /// Encode into the 9-byte wire record
    pub fn encode(&self) -> [u8; EVENT_RECORD_SIZE] {
        let mut out = [0u8; EVENT_RECORD_SIZE];
        out[..8].copy_from_slice(&self.timestamp_us.to_le_bytes());
        out[8] = self.level.as_u8();
        out
    }

    /// Decode one record from the front of `bytes`
    ///
    /// Returns `None` if fewer than `EVENT_RECORD_SIZE` bytes are given.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let record = bytes.get(..EVENT_RECORD_SIZE)?;
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&record[..8]);
        Some(Self {
            timestamp_us: u64::from_le_bytes(ts),
            level: Level::from_bit(record[8] as u32),
        })
    }
}

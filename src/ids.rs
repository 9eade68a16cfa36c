/// Twitter's snowflake epoch (2010-11-04T01:42:54.657Z).
pub const DEFAULT_EPOCH_MS: i64 = 1_288_834_974_657;
pub const DEFAULT_INSTANCE: u16 = 29;

const INSTANCE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const MAX_INSTANCE: u16 = (1 << INSTANCE_BITS) - 1;
const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1;

/// Time-ordered 64-bit id source.
///
/// Layout: `(millis - epoch) << 22 | instance << 12 | sequence`. Ids from one
/// generator are strictly increasing, even when the wall clock stalls or steps back.
pub struct IdGenerator {
    instance: u16,
    epoch_ms: i64,
    last_ms: i64,
    sequence: u16,
    clock: fn() -> i64,
}

fn system_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl IdGenerator {
    pub fn new(instance: u16) -> Self {
        Self::with_clock(instance, DEFAULT_EPOCH_MS, system_millis)
    }

    pub fn with_clock(instance: u16, epoch_ms: i64, clock: fn() -> i64) -> Self {
        IdGenerator {
            instance: instance & MAX_INSTANCE,
            epoch_ms,
            last_ms: i64::MIN,
            sequence: 0,
            clock,
        }
    }

    pub fn next_id(&mut self) -> u64 {
        let now = (self.clock)().max(self.last_ms);
        if now == self.last_ms {
            if self.sequence == MAX_SEQUENCE {
                // Sequence space for this millisecond is spent; borrow the next one.
                self.last_ms += 1;
                self.sequence = 0;
            } else {
                self.sequence += 1;
            }
        } else {
            self.last_ms = now;
            self.sequence = 0;
        }
        let elapsed = (self.last_ms - self.epoch_ms).max(0) as u64;
        (elapsed << (INSTANCE_BITS + SEQUENCE_BITS))
            | ((self.instance as u64) << SEQUENCE_BITS)
            | self.sequence as u64
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_INSTANCE)
    }
}

impl Iterator for IdGenerator {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_id())
    }
}

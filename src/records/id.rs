/// Agent id generation
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Generates millisecond-timestamp ids
///
/// Ids are strictly increasing within one process: when two ids are
/// requested in the same millisecond the later one is bumped past the
/// earlier. Separate processes can still produce the same id.
pub struct IdGenerator {
    last: AtomicI64,
    clock: Clock,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Generator driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(|| Utc::now().timestamp_millis())
    }

    /// Generator driven by a custom millisecond clock
    pub fn with_clock(clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
            clock: Box::new(clock),
        }
    }

    /// Next id, as a decimal string
    pub fn next_id(&self) -> String {
        let now = (self.clock)();
        let mut previous = self.last.load(Ordering::Acquire);

        loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => previous = actual,
            }
        }
    }
}

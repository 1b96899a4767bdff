use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Returns a client-side identifier: milliseconds since the Unix epoch, as a string.
///
/// Ids issued by this process are strictly increasing; when two are requested within the same
/// millisecond the second one is bumped forward. Other devices can still produce the same value.
pub fn generate_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ISSUED.load(Ordering::SeqCst);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ISSUED.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

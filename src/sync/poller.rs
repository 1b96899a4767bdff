use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::model::AppData;
use crate::platform::runtime::{sleep, spawn_detached};
use crate::sync::backend::SyncBackendHandle;
use crate::util::{NextFn, Subscription};

/// Re-loads the document every `interval` and calls back with each version that differs from
/// the previous one, starting from `baseline`. Runs until the returned handle is dropped.
pub(crate) fn spawn_poller(
    backend: SyncBackendHandle,
    interval: Duration,
    baseline: AppData,
    callback: NextFn<AppData>,
) -> Subscription {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    spawn_detached(async move {
        let mut last = baseline;
        loop {
            sleep(interval).await;
            if flag.load(Ordering::SeqCst) {
                break;
            }
            let current = backend.load().await;
            if current != last && !flag.load(Ordering::SeqCst) {
                last = current.clone();
                callback(current);
            }
        }
    });

    Subscription::new(move || cancelled.store(true, Ordering::SeqCst))
}

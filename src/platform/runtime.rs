use std::future::Future;
use std::time::Duration;

/// Spawns `future` on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Spawns `future` on the ambient tokio runtime, or on a lazily built background runtime when
/// the caller is not inside one (plain `fn main`, synchronous tests).
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    use std::sync::LazyLock;
    use tokio::runtime::{Builder, Handle, Runtime};

    static BACKGROUND_RUNTIME: LazyLock<Option<Runtime>> = LazyLock::new(|| {
        match Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("studymate-sync")
            .enable_all()
            .build()
        {
            Ok(runtime) => Some(runtime),
            Err(err) => {
                log::error!("failed to build background runtime: {err}");
                None
            }
        }
    });

    if let Ok(handle) = Handle::try_current() {
        handle.spawn(future);
    } else if let Some(runtime) = BACKGROUND_RUNTIME.as_ref() {
        runtime.spawn(future);
    }
}

/// Asynchronously waits for the provided duration.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    sleep_impl(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep_impl(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_impl(duration: Duration) {
    tokio::time::sleep(duration).await;
}

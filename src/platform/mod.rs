//! Runtime glue that differs between native (tokio) and wasm32 (browser event loop) builds.

pub mod runtime;

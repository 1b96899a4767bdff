pub mod subscribe;

pub use subscribe::{ErrorFn, ListenerSet, NextFn, Subscription};

//! Interface boundary between the Batch SDK client core and the native runtime.
//!
//! Everything that crosses into the platform SDK goes through the traits in
//! this crate. The client core never talks to the network or to the OS push
//! services directly; it hands finished payloads to a [`NativeBridge`] and
//! pulls inbox pages from an [`InboxSource`].
//!
//! # Trait hierarchy
//!
//! - [`NativeBridge`]: fire-and-acknowledge operations (`save`, tracking, push forwarding)
//! - [`InboxSource`]: cursor-based notification history pages
//! - [`BridgeEvents`]: lifecycle events via broadcast channels
//! - [`Bridge`]: composite (auto-implemented for all three)
//!
//! Two implementations ship with the crate: [`StubBridge`], which returns
//! `NotImplemented` for every call, and [`LoopbackBridge`], an in-memory
//! bridge that records dispatches and serves scripted inbox pages.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BridgeError;
pub use traits::{Bridge, BridgeEvents, InboxSource, NativeBridge};
pub use types::*;

mod loopback;
mod stub;
pub use loopback::{DispatchRecord, FetchRecord, LoopbackBridge};
pub use stub::StubBridge;

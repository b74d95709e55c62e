//! The JSON-RPC-shaped stdio dispatcher.
//!
//! This crate owns tool routing, input validation, and response encoding. It
//! never parses Pine Script itself — every request bottoms out in
//! `pinelint_core::review` or `pinelint_core::reference::ReferenceIndex`, and
//! every file or directory read bottoms out in `pinelint_tools::scanner`.

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod stdio;
pub mod wire;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, DispatchResult};

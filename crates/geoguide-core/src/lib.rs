#![forbid(unsafe_code)]

//! Core: section registry, scroll tracking, disclosure cells, and navigation.
//!
//! Everything in this crate is renderer-agnostic. Geometry arrives through the
//! [`tracker::AnchorLookup`] collaborator and time arrives through explicit
//! `tick(dt)` calls, so every state machine can be driven from unit tests
//! without a terminal.

pub mod disclosure;
pub mod geometry;
pub mod logging;
pub mod map;
pub mod navigation;
pub mod observable;
pub mod section;
pub mod tracker;
pub mod transition;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};

#![forbid(unsafe_code)]

//! Terminal edition of the geothermal heating and cooling guide.
//!
//! The guide is one long scrolling document. A contents panel follows the
//! section under the reading line, expandable cells reveal detail on click
//! or hover, and a world map shows example district networks.
//!
//! # Layers
//!
//! - [`session`], [`event`], [`coalescer`]: terminal ownership and input.
//! - [`program`], [`simulator`]: the Elm-style runtime and its headless twin.
//! - [`frame`], [`presenter`]: the cell grid and diffed output.
//! - [`document`], [`views`], [`theme`]: layout and drawing.
//! - [`app`]: the model tying the `geoguide-core` state machines together.
//! - [`cli`], [`logging`]: configuration and log setup for the binary.

pub mod app;
pub mod cli;
pub mod coalescer;
pub mod document;
pub mod event;
pub mod frame;
pub mod logging;
pub mod presenter;
pub mod program;
pub mod session;
pub mod simulator;
pub mod theme;
pub mod views;

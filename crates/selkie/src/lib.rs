#![forbid(unsafe_code)]

//! `selkie` recovers flowchart descriptions from free-form generated text and
//! renders them with graceful degradation: a fragment either becomes a clean
//! SVG diagram or stays plain text, never a broken hybrid.
//!
//! # Features
//!
//! - `raster`: PNG/JPG output via pure-Rust SVG rasterization
//! - `export`: paginated PDF export of rendered document previews

pub use selkie_core::*;

pub mod render;

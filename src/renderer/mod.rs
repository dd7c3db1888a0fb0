//! Canvas2D rendering module
//!
//! A thin adapter that paints a borrowed `GameState` each frame.

pub mod canvas;

pub use canvas::CanvasRenderer;

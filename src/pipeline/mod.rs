//! Detection pipeline
//!
//! The stages between the raw frame feed and the renderer-facing rig: the
//! frame gate decides when detection runs, the expression buffer carries
//! the latest accepted output across the task boundary.

pub mod buffer;
pub mod gate;

pub use buffer::ExpressionBuffer;
pub use gate::FrameGate;

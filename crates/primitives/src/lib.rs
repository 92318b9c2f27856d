//! Core types for live text tracking: positions, edits, growth policies, and buffers.

/// Rope-backed reference buffer.
pub mod buffer;
/// Range delta engine.
pub mod delta;
/// Ranges that follow their text through edits.
pub mod dynamic;
/// Replace-range edits.
pub mod edit;
/// Line/character positions and ranges.
pub mod position;

pub use buffer::{BufferError, TextBuffer};
pub use delta::{Growth, PositionDelta, batch_delta, edit_delta, range_delta, translate_range};
pub use dynamic::DynamicRange;
pub use edit::TextEdit;
pub use position::{Position, TextRange, text_extent};
pub use ropey::Rope;

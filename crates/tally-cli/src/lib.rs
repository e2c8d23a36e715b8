//! Library side of the `tally` binary: argument types, rendering and logging.

pub mod edits;
pub mod logging;
pub mod render;

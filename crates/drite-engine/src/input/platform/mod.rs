//! Native event translation.

pub(crate) mod winit;

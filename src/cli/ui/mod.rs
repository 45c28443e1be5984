//! Terminal rendering helpers: aligned tables and breakdown charts.

pub mod chart;
pub mod table_renderer;

//! RenderingControl service parsing

pub mod parser;

pub use parser::RenderingControlLastChange;

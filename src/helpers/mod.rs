//! Tree-surgery helpers consumed by the mixin engine.

pub mod rule;
pub mod url;

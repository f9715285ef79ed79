//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod styles;

pub(crate) use render::RenderArgs;
pub(crate) use styles::StylesArgs;

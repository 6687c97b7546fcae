mod adapter;
mod core;
mod engine;
mod keymap;
mod ops;
mod render;
mod schema;
mod selection;
mod session;
mod slots;
mod value;

pub use crate::adapter::*;
pub use crate::core::*;
pub use crate::engine::*;
pub use crate::keymap::*;
pub use crate::ops::*;
pub use crate::render::*;
pub use crate::schema::*;
pub use crate::selection::*;
pub use crate::session::*;
pub use crate::slots::*;
pub use crate::value::*;

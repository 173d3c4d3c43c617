pub mod entity;

pub use entity::{Media, MediaId};

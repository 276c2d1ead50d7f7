//! Business logic over a `BlogStore`

pub mod tags;

pub use tags::{is_visible, TagService};

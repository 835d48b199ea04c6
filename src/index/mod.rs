//! Index structures for fast lookup. Each index is independent and incrementally updateable.

pub mod tag_index;
pub mod type_index;

pub use tag_index::TagIndex;
pub use type_index::TypeIndex;

//! Fence records, their document, and shared geometry.

pub mod lenient;
pub mod record;
pub mod store;
pub mod types;

pub use record::{
    FenceRecord, Flag, FlagEncoding, ItemRecord, ItemsField, ItemsType, TabRecord, display_order,
    fallback_unrolled_height, is_valid_unrolled_height, new_id,
};
pub use store::{FenceStore, StoreError, parse_document, read_document, to_document};
pub use types::{Monitor, Rect};

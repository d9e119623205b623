//! Memory module - the reviewable item record
//!
//! - [`Item`]: the persisted/serialized unit of review
//! - Text normalization shared with persistence collaborators
//! - Lenient deserialization: the typed boundary where corrupted field values
//!   are coerced once, so the scheduling math only sees typed values

mod item;
mod lenient;
mod text;

pub use item::{Item, RecordError};
pub use lenient::{format_timestamp, normalize_counter, parse_timestamp};
pub use text::{normalize_notes, normalize_text, MEANING_PLACEHOLDER, WORD_PLACEHOLDER};

pub(crate) use text::DisplayText;

//! Data frames and their JSON encoding
//!
//! A [`Frame`] is the unit pushed through a managed stream. Before fan-out it
//! is encoded once into a [`FrameJsonCache`], which holds the schema and the
//! data halves separately:
//!
//! ```text
//!   Frame ──from_frame()──► FrameJsonCache { schema, data }
//!                                 │
//!               ┌─────────────────┼──────────────────┐
//!               ▼                 ▼                  ▼
//!         Include::All     Include::DataOnly   Include::SchemaOnly
//!        (first push,      (schema unchanged)    (discovery)
//!         schema change)
//! ```
//!
//! Comparing the schema halves of two caches is how a stream decides whether
//! subscribers need the schema again.

pub mod error;
pub mod field;
pub mod json;

pub use error::CodecError;
pub use field::{Field, FieldType, FieldValues, Frame};
pub use json::{FrameJsonCache, Include};

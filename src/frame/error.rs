//! Frame codec error types

use thiserror::Error;

use super::field::FieldType;

/// Error raised while encoding or decoding a frame
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serializing the frame failed
    #[error("failed to encode frame")]
    Encode(#[source] serde_json::Error),

    /// Input is not a valid frame envelope
    #[error("failed to decode frame")]
    Decode(#[source] serde_json::Error),

    /// Envelope carries data but no schema
    #[error("frame has no schema")]
    MissingSchema,

    /// Schema and data disagree on the number of columns
    #[error("schema declares {fields} fields but data has {columns} value arrays")]
    ColumnCountMismatch { fields: usize, columns: usize },

    /// Fields of one frame have different lengths
    #[error("field '{field}' has {len} values, expected {expected}")]
    FieldLengthMismatch {
        field: String,
        len: usize,
        expected: usize,
    },

    /// A non-finite number entity points past the end of its field
    #[error("field '{field}' has {len} values, entity index {index} is out of range")]
    EntityIndex {
        field: String,
        index: usize,
        len: usize,
    },

    /// A value array does not match the declared field type
    #[error("values of field '{field}' do not match type {field_type}")]
    ValueType {
        field: String,
        field_type: FieldType,
        #[source]
        source: serde_json::Error,
    },
}

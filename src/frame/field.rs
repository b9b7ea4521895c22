//! Frame and field types
//!
//! A frame is a small columnar table: every field is one typed column and all
//! columns of a frame have the same length.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use super::error::CodecError;

/// Column type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Timestamps in epoch milliseconds
    Time,
    /// 64-bit floating point numbers
    Number,
    /// UTF-8 strings
    String,
    /// Booleans
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Time => "time",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Column values of a field. `None` entries are nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Time(Vec<Option<i64>>),
    Number(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
}

impl FieldValues {
    /// Empty column of the given type
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Time => FieldValues::Time(Vec::new()),
            FieldType::Number => FieldValues::Number(Vec::new()),
            FieldType::String => FieldValues::String(Vec::new()),
            FieldType::Boolean => FieldValues::Boolean(Vec::new()),
        }
    }

    /// Type of the column
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValues::Time(_) => FieldType::Time,
            FieldValues::Number(_) => FieldType::Number,
            FieldValues::String(_) => FieldType::String,
            FieldValues::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Number of values, nulls included
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Number(v) => v.len(),
            FieldValues::String(v) => v.len(),
            FieldValues::Boolean(v) => v.len(),
        }
    }

    /// Whether the column has no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Serialized as a bare JSON array; the type travels in the schema.
impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValues::Time(v) => v.serialize(serializer),
            FieldValues::Number(v) => v.serialize(serializer),
            FieldValues::String(v) => v.serialize(serializer),
            FieldValues::Boolean(v) => v.serialize(serializer),
        }
    }
}

/// A single named column
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Dimension labels attached to the field
    pub labels: BTreeMap<String, String>,
    /// Column values
    pub values: FieldValues,
}

impl Field {
    /// Create a field from a name and column values
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            values,
        }
    }

    /// Create a time field from epoch milliseconds
    pub fn time(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(name, FieldValues::Time(values.into_iter().map(Some).collect()))
    }

    /// Create a number field
    pub fn number(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            FieldValues::Number(values.into_iter().map(Some).collect()),
        )
    }

    /// Create a string field
    pub fn string<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            FieldValues::String(values.into_iter().map(|s| Some(s.into())).collect()),
        )
    }

    /// Create a boolean field
    pub fn boolean(name: impl Into<String>, values: impl IntoIterator<Item = bool>) -> Self {
        Self::new(
            name,
            FieldValues::Boolean(values.into_iter().map(Some).collect()),
        )
    }

    /// Attach a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Type of the field's values
    pub fn field_type(&self) -> FieldType {
        self.values.field_type()
    }

    /// Number of rows in the field
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named table of equally long fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Frame name
    pub name: String,
    /// Query reference id the frame belongs to
    pub ref_id: String,
    /// Ordered columns
    pub fields: Vec<Field>,
}

impl Frame {
    /// Create an empty frame
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ref_id: String::new(),
            fields: Vec::new(),
        }
    }

    /// Set the reference id
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = ref_id.into();
        self
    }

    /// Append a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of rows
    ///
    /// Fails if the fields disagree on their length.
    pub fn rows(&self) -> Result<usize, CodecError> {
        let Some(first) = self.fields.first() else {
            return Ok(0);
        };
        let expected = first.len();
        for field in &self.fields[1..] {
            if field.len() != expected {
                return Err(CodecError::FieldLengthMismatch {
                    field: field.name.clone(),
                    len: field.len(),
                    expected,
                });
            }
        }
        Ok(expected)
    }

    /// Derive a frame narrowed to a field subset
    ///
    /// Keeps, in their original order, every time field, every field named in
    /// `always`, and every field named in `requested`. Name and ref id are
    /// carried over.
    pub fn with_fields<S: AsRef<str>>(&self, requested: &[S], always: &[S]) -> Frame {
        let wanted = |name: &str| {
            always.iter().any(|n| n.as_ref() == name)
                || requested.iter().any(|n| n.as_ref() == name)
        };

        Frame {
            name: self.name.clone(),
            ref_id: self.ref_id.clone(),
            fields: self
                .fields
                .iter()
                .filter(|f| f.field_type() == FieldType::Time || wanted(&f.name))
                .cloned()
                .collect(),
        }
    }
}

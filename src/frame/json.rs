//! JSON frame codec
//!
//! Frames travel as a JSON envelope with two members:
//!
//! ```text
//! {"schema": {"name": .., "refId": .., "fields": [{"name": .., "type": .., "labels": {..}}]},
//!  "data":   {"values": [[..column 0..], [..column 1..]],
//!             "entities": [null, {"NaN": [0], "Inf": [2], "NegInf": [3]}]}}
//! ```
//!
//! JSON has no NaN or infinity, so such numbers are written as `null` in
//! `values` and their row indexes listed per field in `entities`. The member
//! is omitted when every number is finite.
//!
//! [`FrameJsonCache`] keeps both members pre-rendered so a frame can be sent
//! as schema + data, data only or schema only without encoding it again.

use std::collections::BTreeMap;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::error::CodecError;
use super::field::{Field, FieldType, FieldValues, Frame};

/// Which members of the envelope to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    /// Schema and data
    All,
    /// Data only, for receivers that already hold the schema
    DataOnly,
    /// Schema only
    SchemaOnly,
}

/// Encoded frame, split into schema and data
///
/// Cheap to clone: both halves are reference-counted `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJsonCache {
    schema: Bytes,
    data: Bytes,
}

impl FrameJsonCache {
    /// Encode a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, CodecError> {
        frame.rows()?;

        let schema = SchemaRef {
            name: &frame.name,
            ref_id: &frame.ref_id,
            fields: frame
                .fields
                .iter()
                .map(|f| FieldSchemaRef {
                    name: &f.name,
                    field_type: f.field_type(),
                    labels: &f.labels,
                })
                .collect(),
        };
        let entities: Vec<Option<Entities>> = frame
            .fields
            .iter()
            .map(|f| Entities::of(&f.values))
            .collect();
        let data = DataRef {
            values: frame.fields.iter().map(|f| &f.values).collect(),
            entities: entities.iter().any(Option::is_some).then_some(entities),
        };

        Ok(Self {
            schema: serde_json::to_vec(&schema)
                .map_err(CodecError::Encode)?
                .into(),
            data: serde_json::to_vec(&data).map_err(CodecError::Encode)?.into(),
        })
    }

    /// Whether both frames have an identical schema
    pub fn same_schema(&self, other: &FrameJsonCache) -> bool {
        self.schema == other.schema
    }

    /// Render the envelope
    pub fn bytes(&self, include: Include) -> Bytes {
        match include {
            Include::All => envelope(Some(&self.schema), Some(&self.data)),
            Include::DataOnly => envelope(None, Some(&self.data)),
            Include::SchemaOnly => envelope(Some(&self.schema), None),
        }
    }
}

fn envelope(schema: Option<&Bytes>, data: Option<&Bytes>) -> Bytes {
    let len = schema.map_or(0, |s| s.len()) + data.map_or(0, |d| d.len());
    let mut buf = BytesMut::with_capacity(len + 20);

    buf.put_u8(b'{');
    if let Some(schema) = schema {
        buf.put_slice(b"\"schema\":");
        buf.put_slice(schema);
    }
    if let Some(data) = data {
        if schema.is_some() {
            buf.put_u8(b',');
        }
        buf.put_slice(b"\"data\":");
        buf.put_slice(data);
    }
    buf.put_u8(b'}');

    buf.freeze()
}

impl Frame {
    /// Encode this frame as a JSON envelope
    pub fn to_json(&self, include: Include) -> Result<Bytes, CodecError> {
        Ok(FrameJsonCache::from_frame(self)?.bytes(include))
    }

    /// Decode a frame from a JSON envelope
    ///
    /// The schema is required. A missing `data` member yields a frame with
    /// zero rows.
    pub fn from_json(input: &[u8]) -> Result<Frame, CodecError> {
        let envelope: EnvelopeJson = serde_json::from_slice(input).map_err(CodecError::Decode)?;
        let schema = envelope.schema.ok_or(CodecError::MissingSchema)?;

        let (mut columns, entities) = match envelope.data {
            Some(data) => {
                if data.values.len() != schema.fields.len() {
                    return Err(CodecError::ColumnCountMismatch {
                        fields: schema.fields.len(),
                        columns: data.values.len(),
                    });
                }
                (data.values.into_iter(), data.entities)
            }
            None => (Vec::new().into_iter(), Vec::new()),
        };
        let mut entities = entities.into_iter();

        let fields = schema
            .fields
            .into_iter()
            .map(|fs| {
                let mut values = match columns.next() {
                    Some(column) => decode_column(&fs.name, fs.field_type, column)?,
                    None => FieldValues::empty(fs.field_type),
                };
                if let Some(Some(special)) = entities.next() {
                    special.apply(&fs.name, &mut values)?;
                }
                Ok::<_, CodecError>(Field {
                    name: fs.name,
                    labels: fs.labels,
                    values,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let frame = Frame {
            name: schema.name,
            ref_id: schema.ref_id,
            fields,
        };
        frame.rows()?;
        Ok(frame)
    }
}

fn decode_column(
    name: &str,
    field_type: FieldType,
    column: serde_json::Value,
) -> Result<FieldValues, CodecError> {
    let decoded = match field_type {
        FieldType::Time => serde_json::from_value(column).map(FieldValues::Time),
        FieldType::Number => serde_json::from_value(column).map(FieldValues::Number),
        FieldType::String => serde_json::from_value(column).map(FieldValues::String),
        FieldType::Boolean => serde_json::from_value(column).map(FieldValues::Boolean),
    };
    decoded.map_err(|source| CodecError::ValueType {
        field: name.to_string(),
        field_type,
        source,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRef<'a> {
    #[serde(skip_serializing_if = "is_blank")]
    name: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    ref_id: &'a str,
    fields: Vec<FieldSchemaRef<'a>>,
}

#[derive(Serialize)]
struct FieldSchemaRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(skip_serializing_if = "has_no_labels")]
    labels: &'a BTreeMap<String, String>,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

fn has_no_labels(labels: &&BTreeMap<String, String>) -> bool {
    labels.is_empty()
}

#[derive(Serialize)]
struct DataRef<'a> {
    values: Vec<&'a FieldValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<Vec<Option<Entities>>>,
}

/// Row indexes of the non-finite numbers of one field
#[derive(Debug, Default, Serialize, Deserialize)]
struct Entities {
    #[serde(rename = "NaN", default, skip_serializing_if = "Vec::is_empty")]
    nan: Vec<usize>,
    #[serde(rename = "Inf", default, skip_serializing_if = "Vec::is_empty")]
    inf: Vec<usize>,
    #[serde(rename = "NegInf", default, skip_serializing_if = "Vec::is_empty")]
    neg_inf: Vec<usize>,
}

impl Entities {
    fn of(values: &FieldValues) -> Option<Entities> {
        let FieldValues::Number(numbers) = values else {
            return None;
        };

        let mut entities = Entities::default();
        for (idx, n) in numbers.iter().enumerate() {
            match n {
                Some(n) if n.is_nan() => entities.nan.push(idx),
                Some(n) if *n == f64::INFINITY => entities.inf.push(idx),
                Some(n) if *n == f64::NEG_INFINITY => entities.neg_inf.push(idx),
                _ => {}
            }
        }

        let empty =
            entities.nan.is_empty() && entities.inf.is_empty() && entities.neg_inf.is_empty();
        (!empty).then_some(entities)
    }

    fn apply(self, field: &str, values: &mut FieldValues) -> Result<(), CodecError> {
        // Only number columns can hold non-finite values
        let FieldValues::Number(numbers) = values else {
            return Ok(());
        };

        let len = numbers.len();
        let groups = [
            (self.nan, f64::NAN),
            (self.inf, f64::INFINITY),
            (self.neg_inf, f64::NEG_INFINITY),
        ];
        for (indexes, value) in groups {
            for idx in indexes {
                let slot = numbers.get_mut(idx).ok_or_else(|| CodecError::EntityIndex {
                    field: field.to_string(),
                    index: idx,
                    len,
                })?;
                *slot = Some(value);
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct EnvelopeJson {
    schema: Option<SchemaJson>,
    data: Option<DataJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaJson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ref_id: String,
    #[serde(default)]
    fields: Vec<FieldSchemaJson>,
}

#[derive(Deserialize)]
struct FieldSchemaJson {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct DataJson {
    #[serde(default)]
    values: Vec<serde_json::Value>,
    #[serde(default)]
    entities: Vec<Option<Entities>>,
}

use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    core::{
        fields::RecordTable,
        record::{FieldDescriptor, FieldKind, FieldValue},
    },
    error::CsvError,
};

/// Builds a [`RecordTable`] from any serializable value.
///
/// A struct or map is a single record. A sequence is a collection whose
/// shape is taken from its first element: later elements are read by the
/// first element's keys, missing keys become `Null` and extra keys are
/// dropped.
///
/// # Errors
///
/// `CsvError::InvalidInput` when the value (or the sequence element) does not
/// serialize to a map, when a sequence is empty, or when a field holds a
/// nested map or sequence.
pub fn table_from_serialized<T: Serialize + ?Sized>(target: &T) -> Result<RecordTable, CsvError> {
    let value = serde_json::to_value(target)
        .map_err(|error| CsvError::InvalidInput(error.to_string()))?;

    match value {
        Value::Object(map) => {
            let fields = shape_of(&map);
            let row = read_row(&fields, &map, 0)?;
            Ok(RecordTable {
                fields,
                rows: vec![row],
            })
        }
        Value::Array(items) => {
            let fields = match items.first() {
                Some(Value::Object(first)) => shape_of(first),
                Some(other) => {
                    return Err(CsvError::InvalidInput(format!(
                        "sequence element is not a record: {}",
                        kind_name(other)
                    )));
                }
                None => {
                    return Err(CsvError::InvalidInput(
                        "cannot determine the record shape of an empty sequence".to_string(),
                    ));
                }
            };

            let mut rows = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(map) => rows.push(read_row(&fields, map, index)?),
                    other => {
                        return Err(CsvError::InvalidInput(format!(
                            "sequence element {} is not a record: {}",
                            index,
                            kind_name(other)
                        )));
                    }
                }
            }
            Ok(RecordTable { fields, rows })
        }
        other => Err(CsvError::InvalidInput(format!(
            "value is not a record: {}",
            kind_name(&other)
        ))),
    }
}

fn shape_of(map: &Map<String, Value>) -> Vec<FieldDescriptor> {
    map.iter()
        .map(|(name, value)| FieldDescriptor::new(name, kind_of(value)))
        .collect()
}

fn kind_of(value: &Value) -> FieldKind {
    match value {
        Value::String(_) => FieldKind::Text,
        Value::Bool(_) => FieldKind::Boolean,
        Value::Number(number) if number.is_f64() => FieldKind::Float,
        Value::Number(_) => FieldKind::Integer,
        _ => FieldKind::Unknown,
    }
}

fn read_row(
    fields: &[FieldDescriptor],
    map: &Map<String, Value>,
    index: usize,
) -> Result<Vec<FieldValue>, CsvError> {
    fields
        .iter()
        .map(|field| match map.get(field.name()) {
            Some(value) => to_field_value(field.name(), value),
            None => {
                warn!(
                    "Record {} has no field `{}`, rendering it empty",
                    index,
                    field.name()
                );
                Ok(FieldValue::Null)
            }
        })
        .collect()
}

fn to_field_value(name: &str, value: &Value) -> Result<FieldValue, CsvError> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Bool(flag) => Ok(FieldValue::Boolean(*flag)),
        Value::String(text) => Ok(FieldValue::Text(text.clone())),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(FieldValue::Integer(integer))
            } else if let Some(unsigned) = number.as_u64() {
                Ok(FieldValue::Unsigned(unsigned))
            } else {
                Ok(FieldValue::Float(number.as_f64().unwrap_or(f64::NAN)))
            }
        }
        other => Err(CsvError::InvalidInput(format!(
            "field `{}` is not a scalar: {}",
            name,
            kind_name(other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

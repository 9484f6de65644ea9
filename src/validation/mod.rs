//! Declarative field schemas for request bodies.
//!
//! A [`Schema`] is declared once per resource as a `const` list of fields,
//! each tagged required or optional. Incoming bodies are checked with
//! [`validate`] and projected with [`extract`]; the resulting
//! [`ValidatedRecord`] is the only thing handlers hand to storage.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Untyped request payload for create/update operations
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub requirement: Requirement,
}

impl Field {
    pub const fn required(name: &'static str) -> Self {
        Self { name, requirement: Requirement::Required }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self { name, requirement: Requirement::Optional }
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

/// Ordered field-requirement map for one resource type
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    name: &'static str,
    fields: &'static [Field],
}

/// A malformed schema declaration. Raised by [`Schema::check`] at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema '{0}' declares no fields")]
    Empty(&'static str),

    #[error("Schema '{schema}' has an empty field name")]
    EmptyFieldName { schema: &'static str },

    #[error("Schema '{schema}' declares field '{field}' more than once")]
    DuplicateField { schema: &'static str, field: &'static str },
}

/// Request-time rejection of an input body
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body is not a valid {0} object")]
    NotAnObject(&'static str),

    #[error("Request body is not a valid {schema} object")]
    MissingFields { schema: &'static str, fields: Vec<&'static str> },
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().filter(|f| f.is_required()).map(|f| f.name)
    }

    pub fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.name == key)
    }

    /// Reject declarations that cannot be used as a sanitization boundary.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty(self.name));
        }
        let mut seen = HashSet::new();
        for field in self.fields {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName { schema: self.name });
            }
            if !seen.insert(field.name) {
                return Err(SchemaError::DuplicateField { schema: self.name, field: field.name });
            }
        }
        Ok(())
    }

    /// Fields marked required that `record` lacks, in declaration order
    pub fn missing_fields(&self, record: &Record) -> Vec<&'static str> {
        self.required_fields().filter(|name| !record.contains_key(*name)).collect()
    }

    /// Validate then extract an arbitrary JSON body in one step.
    pub fn accept(&self, body: &Value) -> Result<ValidatedRecord, ValidationError> {
        let record = body.as_object().ok_or(ValidationError::NotAnObject(self.name))?;
        let missing = self.missing_fields(record);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { schema: self.name, fields: missing });
        }
        Ok(extract(record, self))
    }
}

/// True iff every required field of `schema` is a key of `record`.
/// Only presence is checked; values are not inspected.
pub fn validate(record: &Record, schema: &Schema) -> bool {
    schema.required_fields().all(|name| record.contains_key(name))
}

/// Project `record` onto the keys `schema` declares. Undeclared keys are
/// dropped and absent keys stay absent.
pub fn extract(record: &Record, schema: &Schema) -> ValidatedRecord {
    let fields = schema
        .fields()
        .iter()
        .filter_map(|field| record.get(field.name).map(|v| (field.name, v.clone())))
        .collect();
    ValidatedRecord { fields }
}

/// A record whose keys are a subset of some schema's declared fields.
///
/// Only [`extract`] constructs one, so any column name read from it came from a
/// static schema declaration rather than from client input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedRecord {
    fields: BTreeMap<&'static str, Value>,
}

impl ValidatedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replace the value of an already-present field (e.g. hashing a password).
    /// Keys outside the record are ignored so the subset invariant holds.
    pub fn replace(&mut self, key: &str, value: Value) -> bool {
        match self.fields.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Remove a field from the record
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn to_record(&self) -> Record {
        self.fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_record())
    }
}

//! Field-level validation shared by request bodies and forms

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Field name (camelCase) to first failure message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }
    pub fn get(&self, field: &str) -> Option<&str> { self.0.get(field).map(String::as_str) }
    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let map = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "Invalid value".to_string());
                (camel_case(field), message)
            })
            .collect();
        Self(map)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' { upper = true; continue; }
        if upper { out.extend(c.to_uppercase()); upper = false; } else { out.push(c); }
    }
    out
}

pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(invalid("required", "This field is required")); }
    Ok(())
}

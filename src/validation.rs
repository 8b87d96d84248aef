//! Glue between `validator` and the API's field-keyed error body.

use std::{borrow::Cow, collections::BTreeMap};

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Error with a readable message, for checks written by hand.
pub fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// A single failed field.
pub fn field_error(field: &'static str, error: ValidationError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

/// Rejects strings that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be blank"));
    }
    Ok(())
}

/// Flattens nested errors into `field -> messages`. List entries are keyed
/// as `items[0].quantity`, nested structs as `outer.inner`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect("", errors, &mut out);
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => out
                .entry(path)
                .or_default()
                .extend(list.iter().map(message)),
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(entries) => {
                for (idx, inner) in entries {
                    collect(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

fn message(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

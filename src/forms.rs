use serde::Serialize;
use std::collections::BTreeMap;

/// FormField
///
/// One input of a rendered form. `attrs` are the widget's HTML attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub input_type: String,
    pub value: String,
    pub attrs: BTreeMap<String, String>,
}

impl FormField {
    pub fn new(name: &str, label: &str, input_type: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            input_type: input_type.to_string(),
            value: String::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Copies every field's label into its `placeholder` and `data-placeholder`
/// attributes. Run once after a field list has been built.
pub fn apply_placeholders(fields: &mut [FormField]) {
    for field in fields.iter_mut() {
        field
            .attrs
            .insert("placeholder".to_string(), field.label.clone());
        field
            .attrs
            .insert("data-placeholder".to_string(), field.label.clone());
    }
}

/// FormErrors
///
/// Validation messages keyed by field name; form-wide messages live under
/// [`FormErrors::NON_FIELD`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.field(Self::NON_FIELD)
    }
}

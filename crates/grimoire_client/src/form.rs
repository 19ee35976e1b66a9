use crate::error::ClientError;
use grimoire_core::RecordId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub value: String,
}

impl FormField {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Edit modal contents, pre-populated from a displayed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub id: RecordId,
    pub fields: Vec<FormField>,
}

impl EditForm {
    /// Field value, `""` when the field is unknown.
    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map_or("", |field| field.value.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ClientError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| ClientError::UnknownField(name.to_string()))?;
        field.value = value.into();
        Ok(())
    }
}

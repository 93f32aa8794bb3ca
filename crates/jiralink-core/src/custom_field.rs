//! Custom field values attached to an issue.

use serde::{Deserialize, Serialize};

use crate::diff::FieldChange;
use crate::error::CoreError;
use crate::remote::{RemoteCustomFieldValue, RemoteField};

/// Value of one custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    /// Server-side field identifier (e.g. `customfield_10000`).
    pub id: String,
    /// Display name, when the value was added by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// Which set of fields custom field names are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldContext {
    /// Fields available when editing the issue.
    #[default]
    Edit,
    /// Fields available for a workflow action.
    Action(String),
}

/// Source of the field definitions available on an issue.
pub trait FieldResolver {
    type Error: From<CoreError>;

    /// List the fields available in the given context.
    ///
    /// # Errors
    /// Returns an error if the field definitions cannot be retrieved.
    fn available_fields(&self, context: &FieldContext) -> Result<Vec<RemoteField>, Self::Error>;
}

/// Custom field values of an issue, resolved by name through a [`FieldResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomFieldValueCollection {
    #[serde(skip)]
    context: FieldContext,
    items: Vec<CustomFieldValue>,
    #[serde(skip)]
    baseline: Vec<CustomFieldValue>,
}

impl CustomFieldValueCollection {
    /// Build a collection from hydrated values; they also become the baseline.
    #[must_use]
    pub fn from_remote(values: &[RemoteCustomFieldValue]) -> Self {
        let items: Vec<CustomFieldValue> = values
            .iter()
            .map(|v| CustomFieldValue {
                id: v.customfield_id.clone(),
                name: None,
                values: v.values.clone(),
            })
            .collect();

        Self {
            context: FieldContext::Edit,
            baseline: items.clone(),
            items,
        }
    }

    /// Resolve names against the fields available for edit.
    pub fn for_edit(&mut self) -> &mut Self {
        self.context = FieldContext::Edit;
        self
    }

    /// Resolve names against the fields available for a workflow action.
    pub fn for_action(&mut self, action_id: impl Into<String>) -> &mut Self {
        self.context = FieldContext::Action(action_id.into());
        self
    }

    #[must_use]
    pub fn context(&self) -> &FieldContext {
        &self.context
    }

    /// Set a single-valued custom field by name.
    ///
    /// # Errors
    /// Returns the resolver's error if the name is unknown in the current context.
    pub fn add<R: FieldResolver>(
        &mut self,
        resolver: &R,
        name: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, R::Error> {
        self.add_array(resolver, name, vec![value.into()])
    }

    /// Set a multi-valued custom field by name, replacing any previous value.
    ///
    /// # Errors
    /// Returns the resolver's error if the name is unknown in the current context.
    pub fn add_array<R: FieldResolver>(
        &mut self,
        resolver: &R,
        name: &str,
        values: Vec<String>,
    ) -> Result<&mut Self, R::Error> {
        let id = self.resolve_id(resolver, name)?;
        let value = CustomFieldValue {
            id,
            name: Some(name.to_string()),
            values,
        };

        match self.items.iter_mut().find(|item| item.id == value.id) {
            Some(existing) => *existing = value,
            None => self.items.push(value),
        }
        Ok(self)
    }

    /// Get a custom field value by name, if set on the issue.
    ///
    /// # Errors
    /// Returns the resolver's error if the name is unknown in the current context.
    pub fn get<R: FieldResolver>(
        &self,
        resolver: &R,
        name: &str,
    ) -> Result<Option<&CustomFieldValue>, R::Error> {
        let id = self.resolve_id(resolver, name)?;
        Ok(self.by_id(&id))
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&CustomFieldValue> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomFieldValue> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Descriptors for values that differ from what was hydrated.
    #[must_use]
    pub fn remote_fields(&self) -> Vec<FieldChange> {
        self.items
            .iter()
            .filter(|item| {
                self.baseline
                    .iter()
                    .find(|base| base.id == item.id)
                    .is_none_or(|base| base.values != item.values)
            })
            .map(|item| FieldChange::new(item.id.clone(), item.values.clone()))
            .collect()
    }

    fn resolve_id<R: FieldResolver>(&self, resolver: &R, name: &str) -> Result<String, R::Error> {
        let fields = resolver.available_fields(&self.context)?;

        fields
            .into_iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.id)
            .ok_or_else(|| {
                let err = match &self.context {
                    FieldContext::Edit => CoreError::UnknownCustomField(name.to_string()),
                    FieldContext::Action(action_id) => CoreError::UnknownActionField {
                        name: name.to_string(),
                        action_id: action_id.clone(),
                    },
                };
                err.into()
            })
    }
}

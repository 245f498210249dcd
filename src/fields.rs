//! Resolution of the stored names of the managed properties.

use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::options::{DeletedField, Property, SoftDeleteOptions};

static NAME_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn name_regex() -> &'static regex::Regex {
    NAME_REGEX.get_or_init(|| {
        regex::Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("name regex is valid")
    })
}

/// Stored field names for the lifetime of an installed plugin.
///
/// `deleted_at` / `deleted_by` are `None` when the property is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedFields {
    pub deleted: String,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<String>,
}

impl Default for DeletedFields {
    fn default() -> Self {
        Self {
            deleted: Property::Deleted.as_str().to_string(),
            deleted_at: None,
            deleted_by: None,
        }
    }
}

impl DeletedFields {
    /// Resolve names from options, rejecting invalid or clashing names.
    pub fn resolve(options: &SoftDeleteOptions) -> Result<Self, ConfigError> {
        let deleted = resolve_field_name(&options.deleted, Property::Deleted);
        let deleted_at = options
            .deleted_at
            .is_enabled()
            .then(|| resolve_field_name(&options.deleted_at, Property::DeletedAt));
        let deleted_by = options
            .deleted_by
            .is_enabled()
            .then(|| resolve_field_name(&options.deleted_by, Property::DeletedBy));

        let fields = Self {
            deleted,
            deleted_at,
            deleted_by,
        };
        fields.validate()?;
        Ok(fields)
    }

    pub fn deleted(&self) -> &str {
        &self.deleted
    }

    pub fn deleted_at(&self) -> Option<&str> {
        self.deleted_at.as_deref()
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.deleted_by.as_deref()
    }

    /// Stored name of a property, `None` when disabled.
    pub fn name_of(&self, property: Property) -> Option<&str> {
        match property {
            Property::Deleted => Some(self.deleted()),
            Property::DeletedAt => self.deleted_at(),
            Property::DeletedBy => self.deleted_by(),
        }
    }

    /// Enabled properties with their stored names.
    pub fn enabled(&self) -> Vec<(Property, &str)> {
        [Property::Deleted, Property::DeletedAt, Property::DeletedBy]
            .into_iter()
            .filter_map(|p| self.name_of(p).map(|name| (p, name)))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let enabled = self.enabled();
        for (property, name) in &enabled {
            if !name_regex().is_match(name) {
                return Err(ConfigError::InvalidFieldName {
                    property: property.to_string(),
                    name: name.to_string(),
                });
            }
        }
        for (i, (first, name)) in enabled.iter().enumerate() {
            if let Some((second, _)) = enabled[i + 1..].iter().find(|(_, other)| other == name) {
                return Err(ConfigError::DuplicateFieldName {
                    first: first.to_string(),
                    second: second.to_string(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Stored name for a property: the configured custom name, else the
/// property's own name.
pub fn resolve_field_name(option: &DeletedField, property: Property) -> String {
    option
        .custom_name()
        .map(str::to_string)
        .unwrap_or_else(|| property.as_str().to_string())
}

//! Managed stream configuration

/// Suffix appended to discovered channel names
pub const DEFAULT_DISCOVERY_SUFFIX: &str = "/usage_user";

/// Field kept by every field-narrowed subscription
pub const LABELS_FIELD: &str = "labels";

/// Separator between field names in a subscription path selector
pub const DEFAULT_FIELD_SEPARATOR: char = ',';

/// Configuration shared by every stream a runner creates
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Appended to `prefix + path` by `list_channels`
    pub discovery_suffix: String,

    /// Field names always delivered to field-narrowed subscribers.
    /// Time fields are always delivered regardless of this list.
    pub always_include: Vec<String>,

    /// Separator between field names in the last path segment of a subscription
    pub field_separator: char,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            discovery_suffix: DEFAULT_DISCOVERY_SUFFIX.to_string(),
            always_include: vec![LABELS_FIELD.to_string()],
            field_separator: DEFAULT_FIELD_SEPARATOR,
        }
    }
}

impl StreamConfig {
    /// Set the discovery suffix
    pub fn discovery_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.discovery_suffix = suffix.into();
        self
    }

    /// Add a field delivered to every field-narrowed subscriber
    pub fn always_include(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.always_include.contains(&field) {
            self.always_include.push(field);
        }
        self
    }

    /// Set the field selector separator
    pub fn field_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }
}

//! Error message templates, keyed by constraint kind.
//!
//! Templates use `{{name}}` for the field's display alias plus the
//! constraint's own placeholders: `{{minValue}}`, `{{maxValue}}`,
//! `{{format}}`, `{{compareTo}}`, `{{containsValue}}` and `{{regex}}`.

use super::constraint::ConstraintKind;
use std::collections::HashMap;

const DEFAULT_TEMPLATES: [(ConstraintKind, &str); 11] = [
    (ConstraintKind::NotEmpty, "{{name}} must not be empty"),
    (ConstraintKind::Integer, "{{name}} must be an integer"),
    (ConstraintKind::Numeric, "{{name}} must be a number"),
    (ConstraintKind::Email, "{{name}} must be a valid email address"),
    (
        ConstraintKind::MinLength,
        "{{name}} must be at least {{minValue}} characters long",
    ),
    (
        ConstraintKind::MaxLength,
        "{{name}} must be at most {{maxValue}} characters long",
    ),
    (
        ConstraintKind::Between,
        "{{name}} must be between {{minValue}} and {{maxValue}}",
    ),
    (
        ConstraintKind::Date,
        "{{name}} must be a valid date in the format {{format}}",
    ),
    (ConstraintKind::Equals, "{{name}} must match {{compareTo}}"),
    (ConstraintKind::Contains, "{{name}} must contain {{containsValue}}"),
    (ConstraintKind::Regex, "{{name}} does not match the pattern {{regex}}"),
];

/// Immutable set of message templates handed to a `Validator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    templates: HashMap<ConstraintKind, String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        MessageTemplates {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(kind, template)| (*kind, template.to_string()))
                .collect(),
        }
    }
}

impl MessageTemplates {
    /// Replace the template for one kind, keeping the rest.
    pub fn with(mut self, kind: ConstraintKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    pub fn get(&self, kind: ConstraintKind) -> &str {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or("{{name}} is invalid")
    }

    /// Fill the template for `kind` with the alias and placeholder values.
    ///
    /// Substitution is a single pass over the template, so values are never
    /// themselves scanned for placeholders. Unknown placeholders are kept.
    pub fn render(
        &self,
        kind: ConstraintKind,
        alias: &str,
        placeholders: &[(&str, String)],
    ) -> String {
        let template = self.get(kind);
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            message.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };
            let key = &after[..end];
            let value = if key == "name" {
                Some(alias)
            } else {
                placeholders
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.as_str())
            };
            match value {
                Some(value) => message.push_str(value),
                None => message.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        message.push_str(rest);
        message
    }
}

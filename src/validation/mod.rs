//! Declarative validation of flat string payloads.
//!
//! A [`RuleSet`] maps field names to a [`RuleDescriptor`]; evaluating it
//! against a payload yields every violated constraint as a human-readable
//! message, in rule-set order and then constraint order.
//!
//! ```
//! use accessgate::validation::{evaluate, Constraint, RuleDescriptor, RuleSet};
//! use std::collections::HashMap;
//!
//! let rules = RuleSet::new()
//!     .field("id", RuleDescriptor::required("ID").with(Constraint::Integer))
//!     .field("email", RuleDescriptor::optional("Email").with(Constraint::Email));
//!
//! let errors = evaluate(&HashMap::new(), &rules);
//! assert_eq!(errors, vec!["ID must not be empty".to_string()]);
//! ```

pub mod constraint;
pub mod messages;

pub use constraint::{Constraint, ConstraintKind, Pattern};
pub use messages::MessageTemplates;

use constraint::parse_date;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Rules for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Display name used in messages.
    pub alias: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl RuleDescriptor {
    pub fn required(alias: impl Into<String>) -> Self {
        RuleDescriptor {
            alias: alias.into(),
            required: true,
            constraints: Vec::new(),
        }
    }

    pub fn optional(alias: impl Into<String>) -> Self {
        RuleDescriptor {
            alias: alias.into(),
            required: false,
            constraints: Vec::new(),
        }
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Errors in the definition of a rule set.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RuleError {
    #[error("{field}: minimum length {min} exceeds maximum length {max}")]
    LengthBounds { field: String, min: usize, max: usize },

    #[error("{field}: range minimum is greater than its maximum")]
    InvertedRange { field: String },

    #[error("{field}: date bound {value:?} does not match format {format:?}")]
    DateBound {
        field: String,
        value: String,
        format: String,
    },

    #[error("{field}: cannot be compared with itself")]
    SelfComparison { field: String },
}

/// Ordered mapping of field name to rules.
///
/// Iteration, serialization and evaluation all follow insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(String, RuleDescriptor)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for `name`. Re-adding a field replaces its rules in place.
    pub fn field(mut self, name: impl Into<String>, rules: RuleDescriptor) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name, rules)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&RuleDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleDescriptor)> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check the rule definitions themselves for contradictions.
    pub fn check(&self) -> Result<(), RuleError> {
        for (name, rules) in self.iter() {
            let mut min_len = None;
            let mut max_len = None;

            for constraint in &rules.constraints {
                match constraint {
                    Constraint::MinLength { min } => min_len = Some(*min),
                    Constraint::MaxLength { max } => max_len = Some(*max),
                    Constraint::Between { min, max } if min > max => {
                        return Err(RuleError::InvertedRange {
                            field: name.to_string(),
                        });
                    }
                    Constraint::DateBetween { format, min, max } => {
                        let lo = date_bound(name, min, format)?;
                        let hi = date_bound(name, max, format)?;
                        if lo > hi {
                            return Err(RuleError::InvertedRange {
                                field: name.to_string(),
                            });
                        }
                    }
                    Constraint::Equals { field } if field == name => {
                        return Err(RuleError::SelfComparison {
                            field: name.to_string(),
                        });
                    }
                    _ => {}
                }
            }

            if let (Some(min), Some(max)) = (min_len, max_len) {
                if min > max {
                    return Err(RuleError::LengthBounds {
                        field: name.to_string(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

fn date_bound(field: &str, value: &str, format: &str) -> Result<chrono::NaiveDateTime, RuleError> {
    parse_date(value, format).ok_or_else(|| RuleError::DateBound {
        field: field.to_string(),
        value: value.to_string(),
        format: format.to_string(),
    })
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, rules) in &self.fields {
            map.serialize_entry(name, rules)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to rule descriptors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RuleSet, A::Error> {
                let mut rules = RuleSet::new();
                while let Some((name, descriptor)) =
                    access.next_entry::<String, RuleDescriptor>()?
                {
                    rules = rules.field(name, descriptor);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

/// Violations of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub field: String,
    pub messages: Vec<String>,
}

/// Evaluates rule sets, rendering messages from its templates.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    templates: MessageTemplates,
}

impl Validator {
    pub fn new(templates: MessageTemplates) -> Self {
        Validator { templates }
    }

    /// All violation messages, flattened in field then constraint order.
    ///
    /// An empty result means the payload is valid.
    pub fn evaluate(&self, payload: &HashMap<String, String>, rules: &RuleSet) -> Vec<String> {
        self.evaluate_grouped(payload, rules)
            .into_iter()
            .flat_map(|group| group.messages)
            .collect()
    }

    /// Violation messages grouped per field. Valid fields are omitted.
    pub fn evaluate_grouped(
        &self,
        payload: &HashMap<String, String>,
        rules: &RuleSet,
    ) -> Vec<FieldErrors> {
        rules
            .iter()
            .filter_map(|(name, descriptor)| {
                let messages = self.evaluate_field(payload, rules, name, descriptor);
                (!messages.is_empty()).then(|| FieldErrors {
                    field: name.to_string(),
                    messages,
                })
            })
            .collect()
    }

    fn evaluate_field(
        &self,
        payload: &HashMap<String, String>,
        rules: &RuleSet,
        name: &str,
        descriptor: &RuleDescriptor,
    ) -> Vec<String> {
        let value = payload.get(name).map(String::as_str).unwrap_or("");

        if value.is_empty() {
            // A required field reports only that it is missing; an optional
            // one is skipped entirely.
            if descriptor.required {
                return vec![self.render(&Constraint::NotEmpty, descriptor, rules)];
            }
            return Vec::new();
        }

        descriptor
            .constraints
            .iter()
            .filter(|constraint| !constraint.is_satisfied(value, payload))
            .map(|constraint| self.render(constraint, descriptor, rules))
            .collect()
    }

    fn render(
        &self,
        constraint: &Constraint,
        descriptor: &RuleDescriptor,
        rules: &RuleSet,
    ) -> String {
        let compare_to = match constraint {
            Constraint::Equals { field } => rules
                .get(field)
                .map(|other| other.alias.as_str())
                .unwrap_or(field.as_str()),
            _ => "",
        };
        self.templates.render(
            constraint.kind(),
            &descriptor.alias,
            &constraint.placeholders(compare_to),
        )
    }
}

/// Evaluate `rules` against `payload` with the default message templates.
pub fn evaluate(payload: &HashMap<String, String>, rules: &RuleSet) -> Vec<String> {
    Validator::default().evaluate(payload, rules)
}

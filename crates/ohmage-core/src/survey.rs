//! # Survey Module
//!
//! Item definitions and the show/hide logic built on conditions.
//!
//! A survey is an ordered list of items. An item may carry a condition
//! sentence; the item is displayed only when the condition holds for the
//! responses recorded so far. Conditions may only reference items that come
//! before them, which keeps display decisions free of cycles.

use crate::condition::{ConditionError, Fragment};
use crate::primitives::{ItemId, Responses, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Item definitions keyed by id, as used for condition validation.
pub type ItemDefinitions = BTreeMap<ItemId, ItemDefinition>;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("invalid item id '{0}'")]
    InvalidItemId(String),

    #[error("duplicate item '{0}'")]
    DuplicateItem(ItemId),

    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),

    #[error("condition of item '{item}': {source}")]
    InvalidCondition {
        item: ItemId,
        #[source]
        source: ConditionError,
    },

    #[error("invalid response for item '{item}': {reason}")]
    InvalidResponse { item: ItemId, reason: String },
}

// =============================================================================
// ITEM DEFINITIONS
// =============================================================================

/// One option of a single-choice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub key: i64,
    pub label: String,
}

impl Choice {
    pub fn new(key: i64, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

/// The kind of response an item collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Text,
    Boolean,
    SingleChoice { choices: Vec<Choice> },
}

impl ItemKind {
    pub fn number(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Number { min, max }
    }

    /// Kind of value stored for this item. Choice items store their numeric key.
    pub fn value_kind(&self) -> &'static str {
        match self {
            Self::Number { .. } | Self::SingleChoice { .. } => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
        }
    }

    /// Check that `value` is an acceptable response. `Skipped` always is.
    pub fn accepts(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (_, Value::Skipped) | (Self::Text, Value::Text(_)) | (Self::Boolean, Value::Boolean(_)) => {
                Ok(())
            }
            (_, Value::NotDisplayed) => Err("NOT_DISPLAYED is not a response".to_string()),
            (Self::Number { min, max }, Value::Number(n)) => {
                if min.is_some_and(|min| *n < min) || max.is_some_and(|max| *n > max) {
                    Err(format!(
                        "{} is outside {}..={}",
                        n,
                        min.map_or_else(String::new, |m| m.to_string()),
                        max.map_or_else(String::new, |m| m.to_string())
                    ))
                } else {
                    Ok(())
                }
            }
            (Self::SingleChoice { choices }, Value::Number(n)) => {
                if choices.iter().any(|choice| choice.key as f64 == *n) {
                    Ok(())
                } else {
                    Err(format!("{} is not a choice", n))
                }
            }
            (kind, value) => Err(format!(
                "expected a {} response, found {}",
                kind.value_kind(),
                value.kind_name()
            )),
        }
    }
}

/// A survey item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    #[serde(default)]
    pub prompt: String,
    pub kind: ItemKind,
    /// Condition sentence deciding whether the item is displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl ItemDefinition {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(id),
            prompt: String::new(),
            kind,
            condition: None,
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

// =============================================================================
// SURVEY
// =============================================================================

/// A survey as authored: items in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    pub items: Vec<ItemDefinition>,
}

impl Survey {
    pub fn new(id: impl Into<String>, items: Vec<ItemDefinition>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    /// Parse and validate every condition.
    ///
    /// Each condition is validated against the items defined before it, so
    /// forward and self references fail as unknown items.
    pub fn compile(&self) -> Result<CompiledSurvey, SurveyError> {
        let mut preceding = ItemDefinitions::new();
        let mut items = Vec::with_capacity(self.items.len());

        for definition in &self.items {
            if !ItemId::is_valid(definition.id.as_str()) {
                return Err(SurveyError::InvalidItemId(definition.id.to_string()));
            }
            if preceding.contains_key(&definition.id) {
                return Err(SurveyError::DuplicateItem(definition.id.clone()));
            }

            let condition = definition
                .condition
                .as_deref()
                .map(|sentence| {
                    let fragment = Fragment::parse(sentence)?;
                    fragment.validate(&preceding)?;
                    Ok::<_, ConditionError>(fragment)
                })
                .transpose()
                .map_err(|source| SurveyError::InvalidCondition {
                    item: definition.id.clone(),
                    source,
                })?;

            preceding.insert(definition.id.clone(), definition.clone());
            items.push(CompiledItem {
                definition: definition.clone(),
                condition,
            });
        }

        Ok(CompiledSurvey {
            id: self.id.clone(),
            items,
        })
    }
}

/// An item with its parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledItem {
    pub definition: ItemDefinition,
    pub condition: Option<Fragment>,
}

impl CompiledItem {
    pub fn is_displayed(&self, responses: &Responses) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.evaluate(responses))
    }
}

/// A survey whose conditions are known to be well formed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSurvey {
    pub id: String,
    items: Vec<CompiledItem>,
}

impl CompiledSurvey {
    pub fn items(&self) -> &[CompiledItem] {
        &self.items
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.definition.id == id)
    }

    /// Whether an item is displayed given `responses`. `None` for unknown ids.
    pub fn is_displayed(&self, id: &ItemId, responses: &Responses) -> Option<bool> {
        self.position(id)
            .map(|index| self.items[index].is_displayed(responses))
    }

    /// Items displayed given `responses`, in survey order.
    pub fn displayed_items(&self, responses: &Responses) -> Vec<&ItemDefinition> {
        self.items
            .iter()
            .filter(|item| item.is_displayed(responses))
            .map(|item| &item.definition)
            .collect()
    }

    /// The next displayed item after `after` (or the first, for `None`).
    pub fn next_item(
        &self,
        after: Option<&ItemId>,
        responses: &Responses,
    ) -> Option<&ItemDefinition> {
        let start = match after {
            Some(id) => self.position(id)? + 1,
            None => 0,
        };
        self.items
            .iter()
            .skip(start)
            .find(|item| item.is_displayed(responses))
            .map(|item| &item.definition)
    }

    /// Check a full set of recorded responses.
    ///
    /// `NOT_DISPLAYED` is accepted for items whose condition hides them given
    /// the same responses; every other value goes through [`Self::check_response`].
    pub fn check_responses(&self, responses: &Responses) -> Result<(), SurveyError> {
        for (id, value) in responses {
            if !matches!(value, Value::NotDisplayed) {
                self.check_response(id, value)?;
                continue;
            }
            let index = self
                .position(id)
                .ok_or_else(|| SurveyError::UnknownItem(id.clone()))?;
            if self.items[index].is_displayed(responses) {
                return Err(SurveyError::InvalidResponse {
                    item: id.clone(),
                    reason: "item is displayed, so NOT_DISPLAYED is not a response".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check a single response against its item definition.
    pub fn check_response(&self, id: &ItemId, value: &Value) -> Result<(), SurveyError> {
        let index = self
            .position(id)
            .ok_or_else(|| SurveyError::UnknownItem(id.clone()))?;
        self.items[index]
            .definition
            .kind
            .accepts(value)
            .map_err(|reason| SurveyError::InvalidResponse {
                item: id.clone(),
                reason,
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::BuildError;

    fn survey() -> Survey {
        Survey::new(
            "daily",
            vec![
                ItemDefinition::new("smoker", ItemKind::Boolean).with_prompt("Do you smoke?"),
                ItemDefinition::new("cigarettes", ItemKind::number(Some(0.0), Some(100.0)))
                    .with_condition("smoker = true"),
                ItemDefinition::new(
                    "craving",
                    ItemKind::SingleChoice {
                        choices: vec![Choice::new(0, "none"), Choice::new(1, "strong")],
                    },
                )
                .with_condition("cigarettes > 10 or cigarettes = SKIPPED"),
                ItemDefinition::new("note", ItemKind::Text),
            ],
        )
    }

    fn responses(pairs: &[(&str, Value)]) -> Responses {
        pairs
            .iter()
            .map(|(id, value)| (ItemId::new(*id), value.clone()))
            .collect()
    }

    fn ids(items: Vec<&ItemDefinition>) -> Vec<&str> {
        items.into_iter().map(|def| def.id.as_str()).collect()
    }

    #[test]
    fn display_follows_conditions() {
        let compiled = survey().compile().expect("survey compiles");

        let r = responses(&[("smoker", Value::Boolean(false))]);
        assert_eq!(ids(compiled.displayed_items(&r)), vec!["smoker", "note"]);

        let r = responses(&[
            ("smoker", Value::Boolean(true)),
            ("cigarettes", Value::Number(20.0)),
        ]);
        assert_eq!(
            ids(compiled.displayed_items(&r)),
            vec!["smoker", "cigarettes", "craving", "note"]
        );

        let r = responses(&[
            ("smoker", Value::Boolean(true)),
            ("cigarettes", Value::Skipped),
        ]);
        assert_eq!(compiled.is_displayed(&ItemId::new("craving"), &r), Some(true));
        assert_eq!(compiled.is_displayed(&ItemId::new("ghost"), &r), None);
    }

    #[test]
    fn next_item_skips_hidden() {
        let compiled = survey().compile().expect("survey compiles");
        let r = responses(&[("smoker", Value::Boolean(false))]);

        let first = compiled.next_item(None, &r).map(|def| def.id.as_str());
        assert_eq!(first, Some("smoker"));
        let next = compiled
            .next_item(Some(&ItemId::new("smoker")), &r)
            .map(|def| def.id.as_str());
        assert_eq!(next, Some("note"));
        assert!(compiled.next_item(Some(&ItemId::new("note")), &r).is_none());
        assert!(compiled.next_item(Some(&ItemId::new("ghost")), &r).is_none());
    }

    #[test]
    fn forward_references_are_rejected() {
        let survey = Survey::new(
            "bad",
            vec![
                ItemDefinition::new("a", ItemKind::Boolean).with_condition("b = true"),
                ItemDefinition::new("b", ItemKind::Boolean),
            ],
        );
        assert_eq!(
            survey.compile(),
            Err(SurveyError::InvalidCondition {
                item: ItemId::new("a"),
                source: ConditionError::UnknownItem(ItemId::new("b")),
            })
        );
    }

    #[test]
    fn malformed_conditions_fail_at_compile_time() {
        let survey = Survey::new(
            "bad",
            vec![
                ItemDefinition::new("a", ItemKind::Boolean),
                ItemDefinition::new("b", ItemKind::Boolean).with_condition("a = = true"),
            ],
        );
        assert!(matches!(
            survey.compile(),
            Err(SurveyError::InvalidCondition {
                source: ConditionError::Syntax {
                    kind: BuildError::ComparatorMerge,
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn duplicate_and_invalid_ids_are_rejected() {
        let survey = Survey::new(
            "dup",
            vec![
                ItemDefinition::new("a", ItemKind::Text),
                ItemDefinition::new("a", ItemKind::Text),
            ],
        );
        assert_eq!(
            survey.compile(),
            Err(SurveyError::DuplicateItem(ItemId::new("a")))
        );

        let survey = Survey::new("bad-id", vec![ItemDefinition::new("9a", ItemKind::Text)]);
        assert_eq!(
            survey.compile(),
            Err(SurveyError::InvalidItemId("9a".to_string()))
        );
    }

    #[test]
    fn check_response_enforces_kind() {
        let compiled = survey().compile().expect("survey compiles");
        let cigarettes = ItemId::new("cigarettes");
        let craving = ItemId::new("craving");

        assert_eq!(compiled.check_response(&cigarettes, &Value::Number(5.0)), Ok(()));
        assert_eq!(compiled.check_response(&cigarettes, &Value::Skipped), Ok(()));
        assert!(compiled.check_response(&cigarettes, &Value::Number(500.0)).is_err());
        assert!(compiled.check_response(&cigarettes, &Value::Text("many".into())).is_err());
        assert_eq!(compiled.check_response(&craving, &Value::Number(1.0)), Ok(()));
        assert!(compiled.check_response(&craving, &Value::Number(2.0)).is_err());
        assert_eq!(
            compiled.check_response(&ItemId::new("ghost"), &Value::Skipped),
            Err(SurveyError::UnknownItem(ItemId::new("ghost")))
        );
    }

    #[test]
    fn not_displayed_only_for_hidden_items() {
        let compiled = survey().compile().expect("survey compiles");

        let hidden = responses(&[
            ("smoker", Value::Boolean(false)),
            ("cigarettes", Value::NotDisplayed),
            ("craving", Value::NotDisplayed),
        ]);
        assert_eq!(compiled.check_responses(&hidden), Ok(()));

        let shown = responses(&[
            ("smoker", Value::Boolean(true)),
            ("cigarettes", Value::NotDisplayed),
        ]);
        assert!(matches!(
            compiled.check_responses(&shown),
            Err(SurveyError::InvalidResponse { item, .. }) if item.as_str() == "cigarettes"
        ));

        let out_of_range = responses(&[("cigarettes", Value::Number(500.0))]);
        assert!(compiled.check_responses(&out_of_range).is_err());
    }
}

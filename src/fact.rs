//! Skill and trait facts: the typed effect records attached to a document,
//! their fixed display order, and how each kind turns into a tooltip line.

use crate::damage::estimate_damage;
use crate::error::{RenderError, Result};
use crate::utils::group_thousands;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Fact kinds, declared in tooltip order. The derived `Ord` is the display
/// priority, so adding a kind means choosing its place here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum FactType {
    Recharge,
    ResourceCost,
    Damage,
    Percent,
    AttributeAdjust,
    BuffConversion,
    Buff,
    PrefixedBuff,
    Number,
    Radius,
    Duration,
    Time,
    Distance,
    ComboField,
    Heal,
    HealingAdjust,
    NoData,
    Unblockable,
    Range,
    ComboFinisher,
    StunBreak,
}

// The status a prefixed buff is conditional on, e.g. "Stability" in front of "Might".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuffPrefix {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffFact {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<Number>,
    #[serde(default)]
    pub apply_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixedBuffFact {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<Number>,
    #[serde(default)]
    pub apply_count: Option<u32>,
    #[serde(default)]
    pub prefix: Option<BuffPrefix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Fact {
    Recharge {
        #[serde(default)]
        text: String,
        value: Number,
    },
    // Never authored in game data, synthesized from a skill's cost fields.
    ResourceCost {
        #[serde(default)]
        text: String,
        value: Number,
    },
    Damage {
        #[serde(default)]
        text: String,
        hit_count: u32,
        dmg_multiplier: f64,
    },
    Percent {
        #[serde(default)]
        text: String,
        percent: Number,
    },
    AttributeAdjust {
        #[serde(default)]
        text: String,
        #[serde(default)]
        target: Option<String>,
        value: i64,
    },
    BuffConversion {
        #[serde(default)]
        text: String,
        source: String,
        target: String,
        percent: Number,
    },
    Buff(BuffFact),
    PrefixedBuff(PrefixedBuffFact),
    Number {
        #[serde(default)]
        text: String,
        value: Number,
    },
    Radius {
        #[serde(default)]
        text: String,
        distance: i64,
    },
    Duration {
        #[serde(default)]
        text: String,
        duration: Number,
    },
    Time {
        #[serde(default)]
        text: String,
        duration: Number,
    },
    Distance {
        #[serde(default)]
        text: String,
        distance: i64,
    },
    ComboField {
        #[serde(default)]
        text: String,
        field_type: String,
    },
    Heal {
        #[serde(default)]
        text: String,
        hit_count: u32,
    },
    HealingAdjust {
        #[serde(default)]
        text: String,
        hit_count: u32,
    },
    NoData {
        #[serde(default)]
        text: String,
    },
    Unblockable {
        #[serde(default)]
        text: String,
    },
    Range {
        #[serde(default)]
        text: String,
        value: i64,
    },
    ComboFinisher {
        #[serde(default)]
        text: String,
        finisher_type: String,
        percent: u32,
    },
    StunBreak {
        #[serde(default)]
        text: String,
    },
}

/// One rendered tooltip line before glyphs are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactLine {
    pub prefix: Option<String>,
    pub field: String,
    pub value: Option<String>,
}

impl FactLine {
    fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            field: field.into(),
            value: Some(value.into()),
        }
    }

    fn label(field: impl Into<String>) -> Self {
        Self {
            prefix: None,
            field: field.into(),
            value: None,
        }
    }
}

impl fmt::Display for FactLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}", prefix)?;
        }
        write!(f, "{}", self.field)?;
        match &self.value {
            Some(value) if !value.is_empty() => write!(f, ": {}", value),
            _ => Ok(()),
        }
    }
}

const CONDITION_REMOVED: &str = "Condition Removed";

fn is_zero(number: &Number) -> bool {
    number.as_f64() == Some(0.0)
}

fn duration_suffix(duration: Option<&Number>) -> String {
    duration.map_or_else(String::new, |duration| format!("({}s)", duration))
}

// Prefixed buffs hide a zero duration; plain buffs always print it.
fn nonzero_duration_suffix(duration: Option<&Number>) -> String {
    duration_suffix(duration.filter(|duration| !is_zero(duration)))
}

impl Fact {
    pub fn kind(&self) -> FactType {
        match self {
            Fact::Recharge { .. } => FactType::Recharge,
            Fact::ResourceCost { .. } => FactType::ResourceCost,
            Fact::Damage { .. } => FactType::Damage,
            Fact::Percent { .. } => FactType::Percent,
            Fact::AttributeAdjust { .. } => FactType::AttributeAdjust,
            Fact::BuffConversion { .. } => FactType::BuffConversion,
            Fact::Buff(_) => FactType::Buff,
            Fact::PrefixedBuff(_) => FactType::PrefixedBuff,
            Fact::Number { .. } => FactType::Number,
            Fact::Radius { .. } => FactType::Radius,
            Fact::Duration { .. } => FactType::Duration,
            Fact::Time { .. } => FactType::Time,
            Fact::Distance { .. } => FactType::Distance,
            Fact::ComboField { .. } => FactType::ComboField,
            Fact::Heal { .. } => FactType::Heal,
            Fact::HealingAdjust { .. } => FactType::HealingAdjust,
            Fact::NoData { .. } => FactType::NoData,
            Fact::Unblockable { .. } => FactType::Unblockable,
            Fact::Range { .. } => FactType::Range,
            Fact::ComboFinisher { .. } => FactType::ComboFinisher,
            Fact::StunBreak { .. } => FactType::StunBreak,
        }
    }

    /// Renders the fact as a tooltip line. `weapon_type` is the owning skill's
    /// weapon and only matters for damage facts.
    pub fn render(&self, weapon_type: Option<&str>) -> FactLine {
        match self {
            Fact::Recharge { text, value } => FactLine::new(text, format!("{}s", value)),
            Fact::ResourceCost { text, value } | Fact::Number { text, value } => {
                FactLine::new(text, value.to_string())
            }
            Fact::BuffConversion {
                source,
                target,
                percent,
                ..
            } => FactLine::new(
                format!("Gain {} based on a Percentage of {}", target, source),
                format!("{}%", percent),
            ),
            Fact::Damage {
                text,
                hit_count,
                dmg_multiplier,
            } => {
                let estimate = estimate_damage(weapon_type, *hit_count, *dmg_multiplier);
                let coefficient =
                    crate::utils::format_coefficient(dmg_multiplier * f64::from(*hit_count));
                let field = if *hit_count > 1 {
                    format!("{} ({}x)", text, hit_count)
                } else {
                    text.clone()
                };
                FactLine::new(field, format!("{} ({})", estimate, coefficient))
            }
            Fact::AttributeAdjust {
                text,
                target,
                value,
            } => {
                let field = if text.is_empty() {
                    target.clone().unwrap_or_default()
                } else {
                    text.clone()
                };
                FactLine::new(field, group_thousands(*value))
            }
            Fact::PrefixedBuff(buff) => {
                let prefix = buff
                    .prefix
                    .as_ref()
                    .and_then(|prefix| prefix.status.as_deref())
                    .filter(|status| !status.is_empty())
                    .map(|status| format!("{} ", status));
                let line = match buff.apply_count {
                    Some(count) if count > 0 => FactLine {
                        prefix: None,
                        field: format!(
                            "{}{}",
                            buff.status,
                            nonzero_duration_suffix(buff.duration.as_ref())
                        ),
                        value: buff.description.clone(),
                    },
                    _ => FactLine::new(&buff.status, CONDITION_REMOVED),
                };
                FactLine { prefix, ..line }
            }
            Fact::Buff(buff) => match buff.apply_count {
                Some(count) if count > 0 => FactLine {
                    prefix: None,
                    field: format!(
                        "{} {}{}",
                        count,
                        buff.status,
                        duration_suffix(buff.duration.as_ref())
                    ),
                    value: buff.description.clone(),
                },
                _ => FactLine::new(&buff.status, CONDITION_REMOVED),
            },
            Fact::Time { text, duration } | Fact::Duration { text, duration } => {
                FactLine::new(text, format!("{}s", duration))
            }
            Fact::Radius { text, distance } | Fact::Distance { text, distance } => {
                FactLine::new(text, group_thousands(*distance))
            }
            Fact::ComboField { text, field_type } => FactLine::new(text, field_type),
            Fact::ComboFinisher {
                text,
                finisher_type,
                percent,
            } => {
                let value = if *percent == 100 {
                    finisher_type.clone()
                } else {
                    format!("{} ({}%)", finisher_type, percent)
                };
                FactLine::new(text, value)
            }
            Fact::Heal { text, hit_count } | Fact::HealingAdjust { text, hit_count } => {
                FactLine::new(text, hit_count.to_string())
            }
            Fact::NoData { text } => FactLine::label(text),
            Fact::Unblockable { .. } => FactLine::label("Unblockable"),
            Fact::StunBreak { .. } => FactLine::label("Breaks stun"),
            Fact::Percent { text, percent } => FactLine::new(text, format!("{}%", percent)),
            Fact::Range { text, value } => FactLine::new(text, group_thousands(*value)),
        }
    }
}

/// Stable sort by display priority; facts of the same kind keep document order.
pub fn order_facts(facts: &[Fact]) -> Vec<&Fact> {
    let mut ordered: Vec<&Fact> = facts.iter().collect();
    ordered.sort_by_key(|fact| fact.kind());
    ordered
}

pub fn render_facts(facts: &[Fact], weapon_type: Option<&str>) -> Vec<FactLine> {
    order_facts(facts)
        .into_iter()
        .map(|fact| fact.render(weapon_type))
        .collect()
}

/// Checks every raw fact's `type` tag against the known kinds before the
/// document is deserialized, so a schema change is reported by name.
pub fn check_fact_types(document: &Value) -> Result<()> {
    let Some(facts) = document.get("facts") else {
        return Ok(());
    };
    let facts = facts
        .as_array()
        .ok_or_else(|| RenderError::MalformedDocument("facts is not a list".to_string()))?;

    for fact in facts {
        let tag = fact
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RenderError::MalformedDocument("fact without a type".to_string()))?;
        if FactType::from_str(tag).is_err() {
            log::error!("Fact type {tag:?} has no display priority");
            return Err(RenderError::UnknownFactType(tag.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fact(value: Value) -> Fact {
        serde_json::from_value(value).expect("valid fact")
    }

    #[test]
    fn recharge_and_number_keep_source_formatting() {
        let recharge = fact(json!({"type": "Recharge", "text": "Recharge", "value": 20}));
        assert_eq!(recharge.render(None).to_string(), "Recharge: 20s");

        let fractional = fact(json!({"type": "Recharge", "text": "Recharge", "value": 0.75}));
        assert_eq!(fractional.render(None).to_string(), "Recharge: 0.75s");

        let number = fact(json!({"type": "Number", "text": "Stacks", "value": 5}));
        assert_eq!(number.render(None).to_string(), "Stacks: 5");
    }

    #[test]
    fn damage_uses_weapon_estimate_and_hit_suffix() {
        let damage = fact(json!({
            "type": "Damage", "text": "Damage", "hit_count": 3, "dmg_multiplier": 0.5
        }));
        let line = damage.render(Some("Greatsword"));
        assert_eq!(line.field, "Damage (3x)");
        assert_eq!(line.value.as_deref(), Some("606 (1.5)"));

        let single = fact(json!({
            "type": "Damage", "text": "Damage", "hit_count": 1, "dmg_multiplier": 1.0
        }));
        assert_eq!(single.render(None).to_string(), "Damage: 266 (1.0)");
    }

    #[test]
    fn attribute_adjust_falls_back_to_target() {
        let adjust = fact(json!({
            "type": "AttributeAdjust", "target": "Power", "value": 1200
        }));
        assert_eq!(adjust.render(None).to_string(), "Power: 1,200");
    }

    #[test]
    fn buff_with_and_without_application() {
        let applied = fact(json!({
            "type": "Buff", "text": "Apply Buff/Condition", "status": "Might",
            "duration": 8, "apply_count": 3, "description": "Increased outgoing damage."
        }));
        assert_eq!(
            applied.render(None).to_string(),
            "3 Might(8s): Increased outgoing damage."
        );

        let removed = fact(json!({
            "type": "Buff", "text": "Remove", "status": "Poisoned", "apply_count": 0
        }));
        assert_eq!(removed.render(None).to_string(), "Poisoned: Condition Removed");

        let no_description = fact(json!({
            "type": "Buff", "status": "Fury", "duration": 4, "apply_count": 1
        }));
        assert_eq!(no_description.render(None).to_string(), "1 Fury(4s)");
    }

    #[test]
    fn prefixed_buff_carries_nested_status() {
        let prefixed = fact(json!({
            "type": "PrefixedBuff", "status": "Might", "duration": 5, "apply_count": 1,
            "description": "More damage.",
            "prefix": {"text": "Apply", "status": "Stability", "icon": "x"}
        }));
        let line = prefixed.render(None);
        assert_eq!(line.prefix.as_deref(), Some("Stability "));
        assert_eq!(line.field, "Might(5s)");
        assert_eq!(line.value.as_deref(), Some("More damage."));

        let removed = fact(json!({"type": "PrefixedBuff", "status": "Burning", "prefix": {}}));
        let line = removed.render(None);
        assert_eq!(line.prefix, None);
        assert_eq!(line.to_string(), "Burning: Condition Removed");
    }

    #[test]
    fn zero_duration_shows_only_on_plain_buffs() {
        let buff = fact(json!({
            "type": "Buff", "status": "Stability", "duration": 0, "apply_count": 1, "description": "d"
        }));
        assert_eq!(buff.render(None).to_string(), "1 Stability(0s): d");

        let prefixed = fact(json!({
            "type": "PrefixedBuff", "status": "Stability", "duration": 0, "apply_count": 1,
            "description": "d", "prefix": {"status": "Aegis"}
        }));
        assert_eq!(prefixed.render(None).to_string(), "Aegis Stability: d");
    }

    #[test]
    fn damage_coefficient_rounds_ties_to_even() {
        let eighth = fact(json!({
            "type": "Damage", "text": "Damage", "hit_count": 1, "dmg_multiplier": 0.125
        }));
        assert_eq!(eighth.render(None).to_string(), "Damage: 33 (0.12)");

        let five_eighths = fact(json!({
            "type": "Damage", "text": "Damage", "hit_count": 5, "dmg_multiplier": 0.125
        }));
        assert!(five_eighths.render(None).to_string().ends_with("(0.62)"));
    }

    #[test]
    fn combo_finisher_hides_full_chance() {
        let full = fact(json!({
            "type": "ComboFinisher", "text": "Combo Finisher", "finisher_type": "Blast", "percent": 100
        }));
        assert_eq!(full.render(None).to_string(), "Combo Finisher: Blast");

        let partial = fact(json!({
            "type": "ComboFinisher", "text": "Combo Finisher", "finisher_type": "Projectile", "percent": 20
        }));
        assert_eq!(
            partial.render(None).to_string(),
            "Combo Finisher: Projectile (20%)"
        );
    }

    #[test]
    fn fixed_labels_and_distances() {
        assert_eq!(
            fact(json!({"type": "Unblockable", "text": "ignored"})).render(None).to_string(),
            "Unblockable"
        );
        assert_eq!(
            fact(json!({"type": "StunBreak", "value": true})).render(None).to_string(),
            "Breaks stun"
        );
        assert_eq!(
            fact(json!({"type": "Range", "text": "Range", "value": 1200}))
                .render(None)
                .to_string(),
            "Range: 1,200"
        );
        assert_eq!(
            fact(json!({"type": "BuffConversion", "source": "Power", "target": "Ferocity", "percent": 13}))
                .render(None)
                .to_string(),
            "Gain Ferocity based on a Percentage of Power: 13%"
        );
    }

    #[test]
    fn unknown_fact_type_is_reported_by_name() {
        let document = json!({"facts": [{"type": "Recharge", "value": 1}, {"type": "Teleport"}]});
        match check_fact_types(&document) {
            Err(RenderError::UnknownFactType(tag)) => assert_eq!(tag, "Teleport"),
            other => panic!("expected unknown fact type, got {other:?}"),
        }
        assert!(check_fact_types(&json!({"name": "No facts"})).is_ok());
    }
}

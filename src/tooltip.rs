//! Turns skill and trait documents into display records: title, colour,
//! footer and the ordered tooltip lines.

use crate::fact::{Fact, FactLine, render_facts};
use crate::model::{Skill, Trait};
use crate::settings::RenderConfig;
use crate::utils::{strip_markup, substitute_attributes};
use serde::Serialize;
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub text: String,
    pub icon: Option<String>,
}

/// Everything the delivery layer needs to show one tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub color: u32,
    pub thumbnail: Option<String>,
    pub footer: Option<Footer>,
    pub lines: Vec<String>,
}

impl DisplayRecord {
    /// Joins the tooltip lines into newline-separated blocks no longer than
    /// `limit` characters. A single oversized line is cut at the limit.
    pub fn chunk_lines(&self, limit: usize) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for line in &self.lines {
            let line: String = line.chars().take(limit).collect();
            let line_len = line.chars().count();
            let needed = if current.is_empty() {
                line_len
            } else {
                current_len + 1 + line_len
            };

            if needed > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(&line);
            current_len += line_len;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

/// Keeps the last document of each duplicate group.
pub fn dedupe_by<T>(documents: Vec<T>, same: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(documents.len());
    for document in documents {
        match unique.iter().position(|kept| same(kept, &document)) {
            Some(index) => unique[index] = document,
            None => unique.push(document),
        }
    }
    unique
}

// Skills sharing a name and an identical fact list are the same skill to a reader.
pub fn dedupe_skills(skills: Vec<Skill>) -> Vec<Skill> {
    dedupe_by(skills, |a, b| a.name == b.name && a.facts == b.facts)
}

/// The profession resource a skill spends, as a pseudo-fact.
pub fn resource_cost(skill: &Skill, profession: &str) -> Option<Fact> {
    let (resource, value): (&str, &Number) = if let Some(initiative) = &skill.initiative {
        ("Initiative", initiative)
    } else {
        let cost = skill.cost.as_ref()?;
        let resource = match profession {
            "Warrior" => "Adrenaline",
            "Revenant" => "Energy",
            "Ranger" => "Astral Force",
            _ => return None,
        };
        (resource, cost)
    };
    Some(Fact::ResourceCost {
        text: format!("{} cost", resource),
        value: value.clone(),
    })
}

fn slot_number(slot: &str) -> &str {
    slot.get(slot.len().saturating_sub(1)..).unwrap_or_default()
}

/// Footer suffix describing where the skill sits on the skill bar.
pub fn skill_type(skill: &Skill) -> String {
    let slot = skill.slot.as_str();
    if slot.starts_with("Weapon") {
        let weapon = skill.weapon_type.as_deref().unwrap_or_default();
        format!(" {} skill {}", weapon, slot_number(slot))
    } else if slot.starts_with("Profession") {
        format!(" Profession Skill {}", slot_number(slot))
    } else if slot.starts_with("Pet") {
        " Pet skill".to_string()
    } else if slot.starts_with("Downed") {
        format!(" Downed skill {}", slot_number(slot))
    } else {
        " Utility Skill".to_string()
    }
}

pub struct TooltipBuilder<'a> {
    config: &'a RenderConfig,
}

impl<'a> TooltipBuilder<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    pub fn skill(&self, skill: &Skill) -> DisplayRecord {
        let mut record = self.base_record(&skill.name, skill.description.as_deref(), &skill.icon);

        let mut resource = None;
        if let [profession] = skill.professions.as_slice() {
            resource = resource_cost(skill, profession);
            if let Some(color) = self.config.profession_color(profession) {
                record.color = color;
            }
            record.footer = Some(Footer {
                text: format!("{}{}", profession, skill_type(skill)),
                icon: self
                    .config
                    .profession(profession)
                    .and_then(|info| info.icon.clone()),
            });
        }

        if let Some(facts) = &skill.facts {
            let mut facts = facts.clone();
            facts.extend(resource);
            record.lines = self.lines(&facts, skill.weapon_type.as_deref());
        }
        log::debug!("Rendered skill {} ({} lines)", skill.id, record.lines.len());
        record
    }

    pub fn build_trait(&self, trait_doc: &Trait) -> DisplayRecord {
        let mut record = self.base_record(
            &trait_doc.name,
            trait_doc.description.as_deref(),
            &trait_doc.icon,
        );
        if let Some(facts) = &trait_doc.facts {
            record.lines = self.lines(facts, None);
        }
        log::debug!("Rendered trait {} ({} lines)", trait_doc.id, record.lines.len());
        record
    }

    fn base_record(&self, name: &str, description: Option<&str>, icon: &Option<String>) -> DisplayRecord {
        DisplayRecord {
            title: name.to_string(),
            description: description.map(|text| substitute_attributes(&strip_markup(text))),
            url: None,
            color: self.config.default_color,
            thumbnail: icon.clone(),
            footer: None,
            lines: Vec::new(),
        }
    }

    fn lines(&self, facts: &[Fact], weapon_type: Option<&str>) -> Vec<String> {
        render_facts(facts, weapon_type)
            .iter()
            .map(|line| self.compose_line(line))
            .collect()
    }

    /// Glyph, prefix, glyph, field and value, with attribute names rewritten.
    pub fn compose_line(&self, line: &FactLine) -> String {
        let glyphs = &self.config.glyphs;
        let mut text = String::new();
        if let Some(prefix) = line.prefix.as_deref().filter(|prefix| !prefix.is_empty()) {
            text.push_str(glyphs.resolve(prefix));
            text.push_str(prefix);
        }
        text.push_str(glyphs.resolve(&line.field));
        text.push_str(&line.field);
        if let Some(value) = line.value.as_deref().filter(|value| !value.is_empty()) {
            text.push_str(": ");
            text.push_str(value);
        }
        substitute_attributes(&text)
    }
}

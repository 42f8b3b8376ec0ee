// Game documents as served by the document store.
use crate::error::Result;
use crate::fact::{Fact, check_fact_types};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub slot: String, // e.g. "Weapon_1", "Utility", "Profession_2", "Pet", "Downed_3".
    #[serde(default)]
    pub weapon_type: Option<String>,
    #[serde(default)]
    pub initiative: Option<Number>,
    #[serde(default)]
    pub cost: Option<Number>,
    #[serde(default)]
    pub professions: Vec<String>,
    #[serde(default)]
    pub facts: Option<Vec<Fact>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub specialization: Option<u32>,
    #[serde(default)]
    pub facts: Option<Vec<Fact>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: u32,
    pub name: String,
    pub background: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub elite: bool,
    #[serde(default)]
    pub minor_traits: Vec<u32>,
    // Three per tier, adept first.
    #[serde(default)]
    pub major_traits: Vec<u32>,
}

impl Specialization {
    pub fn trait_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.minor_traits
            .iter()
            .chain(self.major_traits.iter())
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameMode {
    #[default]
    Pve,
    Pvp,
    Wvw,
}

/// One chosen specialization line and the major traits picked in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecializationChoice {
    pub id: u32,
    #[serde(default)]
    pub traits: Vec<Option<u32>>,
}

impl SpecializationChoice {
    pub fn is_active(&self, trait_id: u32) -> bool {
        self.traits.contains(&Some(trait_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSpecializations {
    #[serde(default)]
    pub pve: Vec<Option<SpecializationChoice>>,
    #[serde(default)]
    pub pvp: Vec<Option<SpecializationChoice>>,
    #[serde(default)]
    pub wvw: Vec<Option<SpecializationChoice>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub specializations: BuildSpecializations,
}

impl Character {
    // Empty slots (no line chosen) are dropped here.
    pub fn chosen_specializations(&self, mode: GameMode) -> Vec<&SpecializationChoice> {
        let slots = match mode {
            GameMode::Pve => &self.specializations.pve,
            GameMode::Pvp => &self.specializations.pvp,
            GameMode::Wvw => &self.specializations.wvw,
        };
        slots.iter().flatten().collect()
    }
}

/// Deserializes a raw document, rejecting unknown fact types by name first.
pub fn parse_document<T: DeserializeOwned>(document: Value) -> Result<T> {
    check_fact_types(&document)?;
    Ok(serde_json::from_value(document)?)
}

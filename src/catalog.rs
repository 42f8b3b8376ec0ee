use crate::error::{RenderError, Result};
use crate::model::{Skill, Specialization, Trait, parse_document};
use serde_json::Value;
use std::fs::File;
use std::future::Future;
use std::io::BufReader;
use std::path::Path;

pub const SKILLS_FILE: &str = "skills.json";
pub const TRAITS_FILE: &str = "traits.json";
pub const SPECIALIZATIONS_FILE: &str = "specializations.json";

/// Lookup side of the document store. Ids are the game's numeric ids; name
/// searches ignore case and separators.
pub trait DocumentStore {
    fn skill(&self, id: u32) -> impl Future<Output = Result<Skill>> + Send;
    fn trait_doc(&self, id: u32) -> impl Future<Output = Result<Trait>> + Send;
    /// Icon URL of a trait, read without parsing its tooltip facts.
    fn trait_icon(&self, id: u32) -> impl Future<Output = Result<String>> + Send;
    fn specialization(&self, id: u32) -> impl Future<Output = Result<Specialization>> + Send;
    fn find_skills(&self, name: &str) -> impl Future<Output = Result<Vec<Skill>>> + Send;
    fn find_traits(&self, name: &str) -> impl Future<Output = Result<Vec<Trait>>> + Send;
}

pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Documents kept as raw JSON and parsed on lookup, so one skill with a
/// bad fact only fails the requests that touch it.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    skills: Vec<Value>,
    traits: Vec<Value>,
    specializations: Vec<Value>,
}

fn id_of(document: &Value) -> Option<u64> {
    document.get("id").and_then(Value::as_u64)
}

fn name_matches(document: &Value, wanted: &str) -> bool {
    document
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| normalize_name(name) == wanted)
}

fn read_documents(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        log::warn!("No document file at {}", path.display());
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

impl JsonCatalog {
    pub fn new(skills: Vec<Value>, traits: Vec<Value>, specializations: Vec<Value>) -> Self {
        Self {
            skills,
            traits,
            specializations,
        }
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let catalog = Self::new(
            read_documents(&dir.join(SKILLS_FILE))?,
            read_documents(&dir.join(TRAITS_FILE))?,
            read_documents(&dir.join(SPECIALIZATIONS_FILE))?,
        );
        log::info!(
            "Loaded {} skills, {} traits, {} specializations from {}",
            catalog.skills.len(),
            catalog.traits.len(),
            catalog.specializations.len(),
            dir.display()
        );
        Ok(catalog)
    }

    fn by_id(documents: &[Value], id: u32) -> Option<Value> {
        documents
            .iter()
            .find(|document| id_of(document) == Some(u64::from(id)))
            .cloned()
    }

    fn by_name<'a>(documents: &'a [Value], name: &str) -> impl Iterator<Item = &'a Value> {
        let wanted = normalize_name(name);
        documents
            .iter()
            .filter(move |document| name_matches(document, &wanted))
    }
}

impl DocumentStore for JsonCatalog {
    async fn skill(&self, id: u32) -> Result<Skill> {
        let document = Self::by_id(&self.skills, id).ok_or(RenderError::SkillNotFound(id))?;
        parse_document(document)
    }

    async fn trait_doc(&self, id: u32) -> Result<Trait> {
        let document = Self::by_id(&self.traits, id).ok_or(RenderError::TraitNotFound(id))?;
        parse_document(document)
    }

    async fn trait_icon(&self, id: u32) -> Result<String> {
        let document = Self::by_id(&self.traits, id).ok_or(RenderError::TraitNotFound(id))?;
        document
            .get("icon")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RenderError::MalformedDocument(format!("trait {} has no icon", id)))
    }

    async fn specialization(&self, id: u32) -> Result<Specialization> {
        let document = Self::by_id(&self.specializations, id)
            .ok_or(RenderError::SpecializationNotFound(id))?;
        parse_document(document)
    }

    // Only skills some profession can slot; monster and environment skills share names.
    async fn find_skills(&self, name: &str) -> Result<Vec<Skill>> {
        Self::by_name(&self.skills, name)
            .filter(|document| {
                document
                    .get("professions")
                    .and_then(Value::as_array)
                    .is_some_and(|professions| !professions.is_empty())
            })
            .map(|document| parse_document(document.clone()))
            .collect()
    }

    async fn find_traits(&self, name: &str) -> Result<Vec<Trait>> {
        Self::by_name(&self.traits, name)
            .map(|document| parse_document(document.clone()))
            .collect()
    }
}

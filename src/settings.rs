// Application settings, loaded once at startup and frozen into a RenderConfig.
use crate::glyph::GlyphResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const SETTINGS_PATH: &str = "./data/settings.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfessionInfo {
    pub color: String, // Hex without the leading '#'.
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Settings {
    pub wiki_base_url: String,
    pub fetch_timeout_secs: u64,
    pub font_path: Option<PathBuf>, // TrueType font for specialization name labels.
    pub allow_custom_glyphs: bool,
    pub default_color: String,
    pub glyphs: BTreeMap<String, String>,
    pub professions: BTreeMap<String, ProfessionInfo>,
}

fn profession(color: &str) -> ProfessionInfo {
    ProfessionInfo {
        color: color.to_string(),
        icon: None,
    }
}

impl Default for Settings {
    fn default() -> Self {
        let professions = [
            ("guardian", "72C1D9"),
            ("warrior", "FFD166"),
            ("engineer", "D09C59"),
            ("ranger", "8CDC82"),
            ("thief", "C08F95"),
            ("elementalist", "F68A87"),
            ("mesmer", "B679D5"),
            ("necromancer", "52A76F"),
            ("revenant", "D16E5A"),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), profession(color)))
        .collect();

        Settings {
            wiki_base_url: "https://wiki.guildwars2.com/wiki/".to_string(),
            fetch_timeout_secs: 10,
            font_path: None,
            allow_custom_glyphs: true,
            default_color: "C41E3A".to_string(),
            glyphs: BTreeMap::new(),
            professions,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Missing settings file means defaults; a broken one is an error.
    pub fn load() -> io::Result<Self> {
        if !Path::new(SETTINGS_PATH).exists() {
            return Ok(Self::default());
        }
        Self::load_settings_from_file(SETTINGS_PATH)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            glyphs: GlyphResolver::new(self.glyphs.clone(), self.allow_custom_glyphs),
            professions: self
                .professions
                .iter()
                .map(|(name, info)| (name.to_lowercase(), info.clone()))
                .collect(),
            default_color: parse_color(&self.default_color).unwrap_or(0),
            wiki_base_url: self.wiki_base_url.clone(),
        }
    }
}

/// Immutable lookup tables shared by every render call.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub glyphs: GlyphResolver,
    pub professions: BTreeMap<String, ProfessionInfo>,
    pub default_color: u32,
    pub wiki_base_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Settings::default().render_config()
    }
}

impl RenderConfig {
    pub fn profession(&self, name: &str) -> Option<&ProfessionInfo> {
        self.professions.get(&name.to_lowercase())
    }

    pub fn profession_color(&self, name: &str) -> Option<u32> {
        self.profession(name)
            .and_then(|info| parse_color(&info.color))
    }
}

pub fn parse_color(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex.trim_start_matches('#'), 16).ok()
}

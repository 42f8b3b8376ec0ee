use std::collections::BTreeMap;

// Shown when nothing in the vocabulary matches and custom glyphs are allowed.
pub const PLACEHOLDER_GLYPH: &str = "❔";

/// Picks the glyph whose key is the longest substring of a tooltip fragment.
#[derive(Debug, Clone, Default)]
pub struct GlyphResolver {
    glyphs: BTreeMap<String, String>,
    allow_custom: bool,
}

impl GlyphResolver {
    pub fn new(glyphs: BTreeMap<String, String>, allow_custom: bool) -> Self {
        let glyphs = glyphs
            .into_iter()
            .map(|(key, glyph)| (key.to_lowercase(), glyph))
            .collect();
        Self {
            glyphs,
            allow_custom,
        }
    }

    /// Returns the vocabulary key that best matches `fragment`, if any.
    /// Ties between equally long keys go to the alphabetically first one.
    pub fn best_match(&self, fragment: &str) -> Option<&str> {
        let normalized = fragment.replace(' ', "_").to_lowercase();
        let mut best: Option<&str> = None;
        for key in self.glyphs.keys() {
            if normalized.contains(key.as_str()) && key.len() > best.map_or(0, str::len) {
                best = Some(key);
            }
        }
        best
    }

    pub fn resolve(&self, fragment: &str) -> &str {
        match self.best_match(fragment) {
            Some(key) => self.glyphs[key].as_str(),
            None if self.allow_custom => PLACEHOLDER_GLYPH,
            None => "",
        }
    }
}

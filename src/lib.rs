pub mod catalog;
pub mod compositor;
pub mod damage;
pub mod error;
pub mod fact;
pub mod fetch;
pub mod glyph;
pub mod logging;
pub mod model;
pub mod settings;
pub mod tooltip;
pub mod traitline;
pub mod utils;

// Re-export commonly used items for easier access
pub use catalog::{DocumentStore, JsonCatalog};
pub use compositor::{SpecializationArt, SpecializationTile, TraitIcon, render_specialization};
pub use damage::estimate_damage;
pub use error::{RenderError, Result};
pub use fact::{Fact, FactLine, FactType, order_facts, render_facts};
pub use fetch::{HttpImageSource, ImageSource};
pub use glyph::GlyphResolver;
pub use model::{Character, GameMode, Skill, Specialization, SpecializationChoice, Trait};
pub use settings::{RenderConfig, Settings};
pub use tooltip::{DisplayRecord, Footer, TooltipBuilder, dedupe_skills};
pub use traitline::{TraitlineComposer, render_traitlines};

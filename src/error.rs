use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

// Everything that can stop a tooltip or a trait-line image from being produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown fact type: {0}")]
    UnknownFactType(String), // Upstream schema change, the priority table has no entry.

    #[error("Malformed document: {0}")]
    MalformedDocument(String), // A document that does not match the expected shape.

    #[error("Skill not found: {0}")]
    SkillNotFound(u32),

    #[error("Trait not found: {0}")]
    TraitNotFound(u32),

    #[error("Specialization not found: {0}")]
    SpecializationNotFound(u32),

    #[error("Timed out fetching {0}")]
    FetchTimeout(String),

    #[error("Unexpected status {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Icon too small to crop: {width}x{height}")]
    IconTooSmall { width: u32, height: u32 },

    #[error("Nothing to render")]
    NothingToRender, // Every specialization slot was empty.

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Worker join error: {0}")]
    WorkerJoin(String),
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(err: tokio::task::JoinError) -> Self {
        RenderError::WorkerJoin(err.to_string())
    }
}

impl From<ab_glyph::InvalidFont> for RenderError {
    fn from(err: ab_glyph::InvalidFont) -> Self {
        RenderError::Font(err.to_string())
    }
}

use crate::catalog::DocumentStore;
use crate::compositor::{
    SpecializationArt, SpecializationTile, TILE_HEIGHT, TILE_WIDTH, TraitIcon,
    render_specialization,
};
use crate::error::{RenderError, Result};
use crate::fetch::{ImageSource, fetch_with_timeout};
use crate::model::{Character, GameMode, SpecializationChoice};
use ab_glyph::{FontArc, PxScale};
use futures::future::try_join_all;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, imageops};
use imageproc::drawing::draw_text_mut;
use std::io::Cursor;
use std::path::Path;
use tokio::time::Duration;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_LEFT: i32 = 5;
// Distance of the label from the bottom edge of its tile.
const LABEL_RISE: i32 = 35;
const LABEL_SCALE: f32 = 22.0;

/// Stacks specialization tiles into one labelled PNG.
#[derive(Clone, Default)]
pub struct TraitlineComposer {
    font: Option<FontArc>,
}

impl TraitlineComposer {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc> {
        let data = std::fs::read(path)?;
        Ok(FontArc::try_from_vec(data)?)
    }

    pub fn stack(&self, tiles: &[SpecializationTile]) -> Result<RgbImage> {
        if tiles.is_empty() {
            return Err(RenderError::NothingToRender);
        }
        let mut image = RgbImage::new(TILE_WIDTH, TILE_HEIGHT * tiles.len() as u32);

        for (index, tile) in tiles.iter().enumerate() {
            let top = TILE_HEIGHT * index as u32;
            // Alpha is dropped, not blended: the tile already carries its background.
            let rgb = DynamicImage::ImageRgba8(tile.image.clone()).to_rgb8();
            imageops::replace(&mut image, &rgb, 0, i64::from(top));

            match &self.font {
                Some(font) => draw_text_mut(
                    &mut image,
                    LABEL_COLOR,
                    LABEL_LEFT,
                    top as i32 + TILE_HEIGHT as i32 - LABEL_RISE,
                    PxScale::from(LABEL_SCALE),
                    font,
                    &tile.name,
                ),
                None => log::warn!("No font configured, {} is unlabelled", tile.name),
            }
        }
        Ok(image)
    }

    pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        image.write_to(&mut output, ImageFormat::Png)?;
        Ok(output.into_inner())
    }

    /// Composites every specialization, stacks them and encodes the result.
    /// Any failing tile fails the whole image.
    pub fn compose(&self, arts: &[SpecializationArt]) -> Result<Vec<u8>> {
        let tiles = arts
            .iter()
            .map(render_specialization)
            .collect::<Result<Vec<_>>>()?;
        let image = self.stack(&tiles)?;
        Self::encode_png(&image)
    }

    /// Runs `compose` on the blocking pool.
    pub async fn submit(&self, arts: Vec<SpecializationArt>) -> Result<Vec<u8>> {
        let composer = self.clone();
        tokio::task::spawn_blocking(move || composer.compose(&arts)).await?
    }
}

async fn gather_art<D, S>(
    store: &D,
    source: &S,
    choice: &SpecializationChoice,
    limit: Duration,
) -> Result<SpecializationArt>
where
    D: DocumentStore,
    S: ImageSource,
{
    let specialization = store.specialization(choice.id).await?;
    let urls = try_join_all(specialization.trait_ids().map(|id| store.trait_icon(id))).await?;

    let (background, mut minor_icons) = futures::try_join!(
        fetch_with_timeout(source, &specialization.background, limit),
        try_join_all(urls.iter().map(|url| fetch_with_timeout(source, url, limit))),
    )?;
    // Minor icons come first in `trait_ids`.
    let major_bytes = minor_icons.split_off(specialization.minor_traits.len());

    let major_icons = specialization
        .major_traits
        .iter()
        .zip(major_bytes)
        .map(|(&id, bytes)| TraitIcon {
            bytes,
            active: choice.is_active(id),
        })
        .collect();

    Ok(SpecializationArt {
        name: specialization.name,
        background,
        minor_icons,
        major_icons,
    })
}

/// Renders a character's trait lines for one game mode. Documents and images
/// for every line are gathered concurrently; compositing starts only once all
/// of them arrived, and any failure or timeout fails the whole render.
pub async fn render_traitlines<D, S>(
    store: &D,
    source: &S,
    composer: &TraitlineComposer,
    character: &Character,
    mode: GameMode,
    limit: Duration,
) -> Result<Vec<u8>>
where
    D: DocumentStore,
    S: ImageSource,
{
    let choices = character.chosen_specializations(mode);
    if choices.is_empty() {
        return Err(RenderError::NothingToRender);
    }
    log::debug!(
        "Rendering {} {} trait lines for {}",
        choices.len(),
        mode,
        character.name
    );

    let arts = try_join_all(
        choices
            .into_iter()
            .map(|choice| gather_art(store, source, choice, limit)),
    )
    .await?;
    composer.submit(arts).await
}

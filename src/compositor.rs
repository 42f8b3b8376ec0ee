//! Renders one specialization line into a fixed-size tile: the cropped
//! background, the hexagon frame around the emblem, and the trait icons.
//!
//! Every tile is `TILE_WIDTH` x `TILE_HEIGHT` no matter how many traits are
//! active or how large the source art is, so tiles stack without gaps.

use crate::error::{RenderError, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

pub const TILE_WIDTH: u32 = 645;
pub const TILE_HEIGHT: u32 = 135;

// Top of the band cut out of the full-size specialization background.
const BACKGROUND_TOP: u32 = 121;

const OVERLAY_ALPHA: u8 = 135;
const ICON_BORDER: u32 = 4;
const OUTLINE_COLOR: Rgba<u8> = Rgba([183, 190, 195, 255]);

const HEXAGON: [(i32, i32); 6] = [(120, 11), (167, 39), (167, 93), (120, 121), (73, 93), (73, 39)];
const MINOR_STENCIL: [(i32, i32); 8] = [
    (13, 2),
    (25, 2),
    (35, 12),
    (35, 27),
    (21, 36),
    (17, 36),
    (3, 27),
    (3, 12),
];

const MAJOR_LEFT: i64 = 272;
const COLUMN_STEP: i64 = 142;
const ROW_TOP: i64 = 6;
const ICON_GAP: i64 = 3;
const MINOR_OFFSET: i64 = 32;

/// Side of a trait icon: three rows with margins fill the tile height.
pub const ICON_SIZE: u32 = (TILE_HEIGHT - 18) / 3;

#[derive(Debug, Clone)]
pub struct TraitIcon {
    pub bytes: Vec<u8>,
    pub active: bool,
}

/// Encoded art for one specialization, ready to composite.
#[derive(Debug, Clone)]
pub struct SpecializationArt {
    pub name: String,
    pub background: Vec<u8>,
    pub minor_icons: Vec<Vec<u8>>,
    pub major_icons: Vec<TraitIcon>,
}

#[derive(Debug, Clone)]
pub struct SpecializationTile {
    pub name: String,
    pub image: RgbaImage,
}

fn points(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn darken(pixel: &mut Rgba<u8>) {
    pixel.blend(&Rgba([0, 0, 0, OVERLAY_ALPHA]));
}

pub fn major_position(index: usize) -> (i64, i64) {
    let size = i64::from(ICON_SIZE);
    let column = (index / 3) as i64;
    let row = (index % 3) as i64;
    (
        MAJOR_LEFT + COLUMN_STEP * column,
        ROW_TOP + (size + ICON_GAP) * row,
    )
}

pub fn minor_position(index: usize) -> (i64, i64) {
    let size = i64::from(ICON_SIZE);
    (
        MAJOR_LEFT - size - MINOR_OFFSET + COLUMN_STEP * index as i64,
        ROW_TOP + size + ICON_GAP,
    )
}

fn background_band(bytes: &[u8]) -> Result<RgbaImage> {
    let background = image::load_from_memory(bytes)?;
    let band = background
        .crop_imm(0, BACKGROUND_TOP, TILE_WIDTH, TILE_HEIGHT)
        .to_rgba8();
    // Undersized art is padded with transparent black to keep the geometry.
    let mut tile = RgbaImage::new(TILE_WIDTH, TILE_HEIGHT);
    imageops::replace(&mut tile, &band, 0, 0);
    Ok(tile)
}

fn frame_emblem(tile: &mut RgbaImage) {
    let corners = HEXAGON.iter().zip(HEXAGON.iter().cycle().skip(1));
    for (&(x0, y0), &(x1, y1)) in corners {
        for dx in -1..=1 {
            for dy in -1..=1 {
                draw_line_segment_mut(
                    tile,
                    ((x0 + dx) as f32, (y0 + dy) as f32),
                    ((x1 + dx) as f32, (y1 + dy) as f32),
                    OUTLINE_COLOR,
                );
            }
        }
    }

    let mut outside = GrayImage::from_pixel(tile.width(), tile.height(), Luma([255]));
    draw_polygon_mut(&mut outside, &points(&HEXAGON), Luma([0]));
    for (pixel, mask) in tile.pixels_mut().zip(outside.pixels()) {
        if mask[0] > 0 {
            darken(pixel);
        }
    }
}

/// Decodes a trait icon, trims its frame and scales it to `ICON_SIZE`.
pub fn prepare_icon(bytes: &[u8]) -> Result<RgbaImage> {
    let icon = image::load_from_memory(bytes)?;
    let (width, height) = (icon.width(), icon.height());
    if width <= ICON_BORDER * 2 || height <= ICON_BORDER * 2 {
        return Err(RenderError::IconTooSmall { width, height });
    }
    let trimmed = icon
        .crop_imm(
            ICON_BORDER,
            ICON_BORDER,
            width - ICON_BORDER * 2,
            height - ICON_BORDER * 2,
        )
        .to_rgba8();
    Ok(imageops::resize(
        &trimmed,
        ICON_SIZE,
        ICON_SIZE,
        FilterType::Lanczos3,
    ))
}

fn minor_stencil() -> GrayImage {
    let mut stencil = GrayImage::new(ICON_SIZE, ICON_SIZE);
    draw_polygon_mut(&mut stencil, &points(&MINOR_STENCIL), Luma([255]));
    stencil
}

// Copies icon pixels inside the stencil verbatim, no blending.
fn paste_clipped(tile: &mut RgbaImage, icon: &RgbaImage, stencil: &GrayImage, (x, y): (i64, i64)) {
    for (sx, sy, mask) in stencil.enumerate_pixels() {
        if mask[0] == 0 {
            continue;
        }
        let (tx, ty) = (x + i64::from(sx), y + i64::from(sy));
        if tx < 0 || ty < 0 || tx >= i64::from(tile.width()) || ty >= i64::from(tile.height()) {
            continue;
        }
        tile.put_pixel(tx as u32, ty as u32, *icon.get_pixel(sx, sy));
    }
}

pub fn render_specialization(art: &SpecializationArt) -> Result<SpecializationTile> {
    let mut tile = background_band(&art.background)?;
    frame_emblem(&mut tile);

    for (index, trait_icon) in art.major_icons.iter().enumerate() {
        let mut icon = prepare_icon(&trait_icon.bytes)?;
        if !trait_icon.active {
            icon.pixels_mut().for_each(darken);
        }
        let (x, y) = major_position(index);
        imageops::overlay(&mut tile, &icon, x, y);
    }

    let stencil = minor_stencil();
    for (index, bytes) in art.minor_icons.iter().enumerate() {
        let icon = prepare_icon(bytes)?;
        paste_clipped(&mut tile, &icon, &stencil, minor_position(index));
    }

    log::debug!(
        "Composited specialization {} ({} major, {} minor)",
        art.name,
        art.major_icons.len(),
        art.minor_icons.len()
    );
    Ok(SpecializationTile {
        name: art.name.clone(),
        image: tile,
    })
}

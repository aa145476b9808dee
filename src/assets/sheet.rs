use crate::assets::layout::{IconSource, KeyboardLayout};
use crate::overlay::event::KeyId;
use crate::overlay::icons::{IconHandle, IconProvider, StaticIconMap};
use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Edge length of one key icon in the bindings sheet.
pub const SHEET_ICON_SIZE: u32 = 32;
const SHEET_ICON_MARGIN: u32 = 1;
const SHEET_OFFSET_X: f64 = -1.0;
const SHEET_OFFSET_Y: f64 = -104.0;
/// Edge length of one tile in the arrows sheet.
pub const ARROW_TILE_SIZE: u32 = 172;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOrigin {
    pub x: u32,
    pub y: u32,
}

/// Position of `marker` inside `sheet` with the smallest sum of squared RGB
/// differences. Ties go to the first position in row-major order.
pub fn find_origin(sheet: &RgbaImage, marker: &RgbaImage) -> Option<SheetOrigin> {
    let (sheet_w, sheet_h) = sheet.dimensions();
    let (marker_w, marker_h) = marker.dimensions();
    if marker_w == 0 || marker_h == 0 || marker_w > sheet_w || marker_h > sheet_h {
        return None;
    }

    let mut best: Option<(u64, SheetOrigin)> = None;
    for y in 0..=sheet_h - marker_h {
        for x in 0..=sheet_w - marker_w {
            let limit = best.map_or(u64::MAX, |(score, _)| score);
            let score = squared_difference(sheet, marker, x, y, limit);
            if score < limit {
                best = Some((score, SheetOrigin { x, y }));
            }
        }
    }
    best.map(|(_, origin)| origin)
}

/// Stops summing once `limit` is reached; the partial sum is then returned.
fn squared_difference(sheet: &RgbaImage, marker: &RgbaImage, at_x: u32, at_y: u32, limit: u64) -> u64 {
    let mut sum = 0u64;
    for (mx, my, marker_px) in marker.enumerate_pixels() {
        let sheet_px = sheet.get_pixel(at_x + mx, at_y + my);
        for channel in 0..3 {
            let diff = i64::from(sheet_px[channel]) - i64::from(marker_px[channel]);
            sum += (diff * diff) as u64;
        }
        if sum >= limit {
            return sum;
        }
    }
    sum
}

/// Top-left pixel of the icon for `(row, col)`, including the hand-measured
/// nudges of the reference sheet.
pub fn sheet_cell_origin(origin: SheetOrigin, row: u32, col: f64) -> (i64, i64) {
    let pitch = f64::from(SHEET_ICON_SIZE + SHEET_ICON_MARGIN);
    let mut x = (f64::from(origin.x) + col * pitch + SHEET_OFFSET_X + 1e-3) as i64;
    let mut y = (f64::from(origin.y) + f64::from(row) * pitch + SHEET_OFFSET_Y + 1e-3) as i64;

    if row == 0 {
        y -= 5;
    }
    if row == 0 && col > 6.0 && col < 10.0 {
        x += 1;
    }
    if col > 14.0 {
        if row > 3 {
            x += 1;
        }
        x += 1;
    }
    if row == 2 && (col - 13.75).abs() < f64::EPSILON {
        x += 1;
    }
    if row == 3 || row == 4 || (row == 5 && (col - 0.25).abs() >= f64::EPSILON) {
        x -= 1;
    }
    (x, y)
}

fn crop_square(image: &RgbaImage, x: i64, y: i64, size: u32) -> Option<RgbaImage> {
    let x = u32::try_from(x).ok()?;
    let y = u32::try_from(y).ok()?;
    let (width, height) = image.dimensions();
    if x.checked_add(size)? > width || y.checked_add(size)? > height {
        return None;
    }
    Some(imageops::crop_imm(image, x, y, size, size).to_image())
}

/// Four-connected fill of the region sharing the seed pixel's exact colour.
pub fn flood_fill(image: &mut RgbaImage, seed: (u32, u32), fill: Rgba<u8>) {
    let (width, height) = image.dimensions();
    if seed.0 >= width || seed.1 >= height {
        return;
    }
    let target = *image.get_pixel(seed.0, seed.1);
    if target == fill {
        return;
    }

    image.put_pixel(seed.0, seed.1, fill);
    let mut queue = VecDeque::from([seed]);
    while let Some((x, y)) = queue.pop_front() {
        let neighbours = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbours {
            if nx < width && ny < height && *image.get_pixel(nx, ny) == target {
                image.put_pixel(nx, ny, fill);
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Crops one key from the bindings sheet and keys out the area around its
/// rounded corners.
pub fn sheet_icon(sheet: &RgbaImage, origin: SheetOrigin, row: u32, col: f64, chroma_key: Rgba<u8>) -> Option<RgbaImage> {
    let (x, y) = sheet_cell_origin(origin, row, col);
    let mut icon = crop_square(sheet, x, y, SHEET_ICON_SIZE)?;
    let last = SHEET_ICON_SIZE - 1;
    for corner in [(0, 0), (last, 0), (0, last), (last, last)] {
        flood_fill(&mut icon, corner, chroma_key);
    }
    Some(icon)
}

pub fn arrow_icon(arrows: &RgbaImage, x: u32, y: u32) -> Option<RgbaImage> {
    let tile = crop_square(arrows, i64::from(x), i64::from(y), ARROW_TILE_SIZE)?;
    Some(imageops::resize(
        &tile,
        SHEET_ICON_SIZE,
        SHEET_ICON_SIZE,
        FilterType::Nearest,
    ))
}

fn open_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("open image {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Prepared key icons plus the key to icon mapping.
#[derive(Debug, Clone, Default)]
pub struct IconAtlas {
    images: Vec<RgbaImage>,
    icons: StaticIconMap,
}

impl IconAtlas {
    /// Loads the three artwork files. The arrows sheet is optional: without
    /// it, arrow keys simply have no icon.
    pub fn load(
        bindings_path: &Path,
        marker_path: &Path,
        arrows_path: &Path,
        layout: &KeyboardLayout,
        chroma_key: Rgba<u8>,
    ) -> Result<Self> {
        let bindings = open_rgba(bindings_path).context("load key bindings sheet")?;
        let marker = open_rgba(marker_path).context("load origin marker")?;
        let arrows = match open_rgba(arrows_path) {
            Ok(arrows) => Some(arrows),
            Err(err) => {
                tracing::warn!("arrow icons unavailable: {err:#}");
                None
            }
        };
        Self::from_sheets(&bindings, &marker, arrows.as_ref(), layout, chroma_key)
    }

    pub fn from_sheets(
        bindings: &RgbaImage,
        marker: &RgbaImage,
        arrows: Option<&RgbaImage>,
        layout: &KeyboardLayout,
        chroma_key: Rgba<u8>,
    ) -> Result<Self> {
        let origin = find_origin(bindings, marker).ok_or_else(|| {
            anyhow!(
                "origin marker ({}x{}) does not fit in the bindings sheet ({}x{})",
                marker.width(),
                marker.height(),
                bindings.width(),
                bindings.height()
            )
        })?;
        tracing::debug!(x = origin.x, y = origin.y, "located bindings sheet origin");

        let mut images = Vec::new();
        let mut icons: HashMap<KeyId, IconHandle> = HashMap::new();
        let mut cells: Vec<(IconSource, IconHandle)> = Vec::new();

        for (key, source) in layout.iter() {
            if let Some((_, handle)) = cells.iter().find(|(cell, _)| *cell == source) {
                icons.insert(key, *handle);
                continue;
            }

            let image = match source {
                IconSource::Sheet { row, col } => sheet_icon(bindings, origin, row, col, chroma_key),
                IconSource::Arrow { x, y } => arrows.and_then(|arrows| arrow_icon(arrows, x, y)),
            };
            let Some(image) = image else {
                tracing::warn!(key = key.vk(), ?source, "no icon for key; its events will be ignored");
                continue;
            };

            let handle = IconHandle(images.len());
            images.push(image);
            cells.push((source, handle));
            icons.insert(key, handle);
        }

        tracing::info!(keys = icons.len(), icons = images.len(), "prepared key icons");
        Ok(Self {
            images,
            icons: StaticIconMap::new(icons),
        })
    }

    pub fn images(&self) -> &[RgbaImage] {
        &self.images
    }

    pub fn image(&self, handle: IconHandle) -> Option<&RgbaImage> {
        self.images.get(handle.0)
    }

    pub fn key_count(&self) -> usize {
        self.icons.len()
    }
}

impl IconProvider for IconAtlas {
    fn resolve_icon(&self, key: KeyId) -> Option<IconHandle> {
        self.icons.resolve_icon(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn patterned(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 6) as u8, (y * 8) as u8, ((x * y) % 256) as u8, 255])
        })
    }

    #[test]
    fn template_match_finds_exact_marker_position() {
        let sheet = patterned(40, 30);
        let marker = imageops::crop_imm(&sheet, 7, 5, 4, 3).to_image();

        assert_eq!(find_origin(&sheet, &marker), Some(SheetOrigin { x: 7, y: 5 }));
    }

    #[test]
    fn template_match_rejects_oversized_marker() {
        let sheet = patterned(4, 4);
        let marker = patterned(5, 2);
        assert_eq!(find_origin(&sheet, &marker), None);
    }

    #[test]
    fn flood_fill_stops_at_other_colours() {
        let mut image = RgbaImage::from_pixel(4, 4, WHITE);
        for y in 0..4 {
            image.put_pixel(2, y, BLACK);
        }

        flood_fill(&mut image, (0, 0), GREEN);

        assert_eq!(*image.get_pixel(1, 3), GREEN);
        assert_eq!(*image.get_pixel(2, 1), BLACK);
        assert_eq!(*image.get_pixel(3, 0), WHITE);
    }

    #[test]
    fn cell_origin_applies_sheet_nudges() {
        let origin = SheetOrigin { x: 200, y: 300 };
        assert_eq!(sheet_cell_origin(origin, 0, 0.0), (199, 191));
        assert_eq!(sheet_cell_origin(origin, 0, 6.5), (414, 191));
        assert_eq!(sheet_cell_origin(origin, 2, 13.75), (653, 262));
        assert_eq!(sheet_cell_origin(origin, 5, 0.25), (207, 361));
        assert_eq!(sheet_cell_origin(origin, 5, 3.25), (305, 361));
        assert_eq!(sheet_cell_origin(origin, 4, 0.75), (222, 328));
        assert_eq!(sheet_cell_origin(origin, 1, 16.25), (736, 229));
    }

    #[test]
    fn arrow_tiles_are_scaled_to_icon_size() {
        let arrows = RgbaImage::from_pixel(411, 400, WHITE);
        let icon = arrow_icon(&arrows, 239, 228).expect("tile fits");
        assert_eq!(icon.dimensions(), (SHEET_ICON_SIZE, SHEET_ICON_SIZE));
        assert!(arrow_icon(&arrows, 240, 228).is_none());
    }

    fn synthetic_bindings() -> (RgbaImage, RgbaImage) {
        let mut sheet = RgbaImage::from_pixel(200, 200, BLACK);
        let marker = RgbaImage::from_fn(3, 3, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        imageops::replace(&mut sheet, &marker, 150, 150);
        // Glyph in the middle of cell (1, 0), whose crop starts at (149, 79).
        for y in 89..101 {
            for x in 159..171 {
                sheet.put_pixel(x, y, WHITE);
            }
        }
        (sheet, marker)
    }

    #[test]
    fn atlas_crops_keys_and_skips_cells_off_the_sheet() {
        let (sheet, marker) = synthetic_bindings();
        let layout = KeyboardLayout::new(vec![
            (KeyId(0x31), IconSource::Sheet { row: 1, col: 0.0 }),
            (KeyId(0x10), IconSource::Sheet { row: 1, col: 0.0 }),
            (KeyId(0x7B), IconSource::Sheet { row: 0, col: 20.0 }),
            (KeyId(0x26), IconSource::Arrow { x: 0, y: 0 }),
        ]);

        let atlas = IconAtlas::from_sheets(&sheet, &marker, None, &layout, GREEN).expect("atlas");

        assert_eq!(atlas.images().len(), 1);
        assert_eq!(atlas.key_count(), 2);
        let handle = atlas.resolve_icon(KeyId(0x31)).expect("digit icon");
        assert_eq!(atlas.resolve_icon(KeyId(0x10)), Some(handle));
        assert_eq!(atlas.resolve_icon(KeyId(0x7B)), None);
        assert_eq!(atlas.resolve_icon(KeyId(0x26)), None);

        let icon = atlas.image(handle).expect("image");
        assert_eq!(*icon.get_pixel(0, 0), GREEN);
        assert_eq!(*icon.get_pixel(31, 31), GREEN);
        assert_eq!(*icon.get_pixel(16, 16), WHITE);
    }

    #[test]
    fn atlas_fails_when_marker_is_larger_than_sheet() {
        let sheet = RgbaImage::from_pixel(2, 2, BLACK);
        let marker = RgbaImage::from_pixel(3, 3, BLACK);
        let layout = KeyboardLayout::standard();
        assert!(IconAtlas::from_sheets(&sheet, &marker, None, &layout, GREEN).is_err());
    }
}

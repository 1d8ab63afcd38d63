//! Compositing the clock image from SVG assets
//!
//! Every asset is drawn scaled into the largest square centered in the target,
//! hands rotated about the target's center. The result is a premultiplied
//! RGBA pixmap on a transparent background.

use crate::config::Settings;
use crate::hands::HandAngles;
use resvg::usvg;
use std::path::Path;
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("SVG error: {0}")]
    Svg(#[from] usvg::Error),
}

/// The images a clock is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    Face,
    HourHand,
    MinuteHand,
    SecondHand,
    Preview,
}

impl AssetSlot {
    fn bundled(self) -> &'static str {
        match self {
            AssetSlot::Face => include_str!("../assets/face.svg"),
            AssetSlot::HourHand => include_str!("../assets/hour_hand.svg"),
            AssetSlot::MinuteHand => include_str!("../assets/minute_hand.svg"),
            AssetSlot::SecondHand => include_str!("../assets/second_hand.svg"),
            AssetSlot::Preview => include_str!("../assets/preview.svg"),
        }
    }

    fn file_name(self, settings: &Settings) -> &str {
        match self {
            AssetSlot::Face => &settings.clock_face,
            AssetSlot::HourHand => &settings.hour_hand,
            AssetSlot::MinuteHand => &settings.minute_hand,
            AssetSlot::SecondHand => &settings.second_hand,
            AssetSlot::Preview => &settings.preview,
        }
    }

    pub fn load_bundled(self) -> Result<usvg::Tree, AssetError> {
        parse_svg(self.bundled().as_bytes())
    }

    /// Load the asset configured in `settings`, falling back to the bundled
    /// one when the custom file is missing or broken.
    pub fn load(self, settings: &Settings) -> Result<usvg::Tree, AssetError> {
        let Some(path) = settings.asset_path(self.file_name(settings)) else {
            return self.load_bundled();
        };
        match load_svg(&path) {
            Ok(tree) => {
                tracing::debug!(path = %path.display(), "loaded {:?}", self);
                Ok(tree)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "using bundled {:?}: {e}", self);
                self.load_bundled()
            }
        }
    }
}

pub fn parse_svg(data: &[u8]) -> Result<usvg::Tree, AssetError> {
    let svg_str = std::str::from_utf8(data)?;
    let opt = usvg::Options::default();
    let fontdb = usvg::fontdb::Database::new();
    Ok(usvg::Tree::from_str(svg_str, &opt, &fontdb)?)
}

pub fn load_svg(path: &Path) -> Result<usvg::Tree, AssetError> {
    let data = std::fs::read(path)?;
    parse_svg(&data)
}

/// Parsed face and hands
pub struct ClockAssets {
    face: usvg::Tree,
    hour: usvg::Tree,
    minute: usvg::Tree,
    second: usvg::Tree,
}

impl ClockAssets {
    #[cfg(test)]
    pub fn bundled() -> Result<Self, AssetError> {
        Ok(Self {
            face: AssetSlot::Face.load_bundled()?,
            hour: AssetSlot::HourHand.load_bundled()?,
            minute: AssetSlot::MinuteHand.load_bundled()?,
            second: AssetSlot::SecondHand.load_bundled()?,
        })
    }

    pub fn load(settings: &Settings) -> Result<Self, AssetError> {
        Ok(Self {
            face: AssetSlot::Face.load(settings)?,
            hour: AssetSlot::HourHand.load(settings)?,
            minute: AssetSlot::MinuteHand.load(settings)?,
            second: AssetSlot::SecondHand.load(settings)?,
        })
    }
}

/// Scale `tree` into a `side`-sized square centered on (cx, cy).
fn fit_transform(tree: &usvg::Tree, side: f32, cx: f32, cy: f32) -> Transform {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    let scale = (side / w).min(side / h);
    Transform::from_row(scale, 0.0, 0.0, scale, cx - w * scale / 2.0, cy - h * scale / 2.0)
}

/// Draw face and hands into a fresh `width` × `height` pixmap.
///
/// Back to front: face, hour, minute, then second hand. The second hand is
/// skipped entirely when `show_second_hand` is false.
pub fn render_clock(
    assets: &ClockAssets,
    width: u32,
    height: u32,
    angles: HandAngles,
    show_second_hand: bool,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    let side = width.min(height) as f32;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);

    resvg::render(&assets.face, fit_transform(&assets.face, side, cx, cy), &mut pixmap.as_mut());

    let mut hands = vec![(&assets.hour, angles.hour), (&assets.minute, angles.minute)];
    if show_second_hand {
        hands.push((&assets.second, angles.second));
    }
    for (tree, angle) in hands {
        let transform = Transform::from_rotate_at(angle, cx, cy).pre_concat(fit_transform(tree, side, cx, cy));
        resvg::render(tree, transform, &mut pixmap.as_mut());
    }

    Some(pixmap)
}

/// Rasterise an SVG into a square of straight-alpha RGBA, as window icons
/// expect. Returns the pixel data and the side length.
pub fn render_icon(tree: &usvg::Tree, side: u32) -> Option<(Vec<u8>, u32)> {
    let mut pixmap = Pixmap::new(side, side)?;
    let half = side as f32 / 2.0;
    resvg::render(tree, fit_transform(tree, side as f32, half, half), &mut pixmap.as_mut());

    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Some((rgba, side))
}

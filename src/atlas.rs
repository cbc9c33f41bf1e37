//! Atlas slicing - cuts packed sprites back out of their texture atlases
//!
//! Sprite frames are grouped by texture key, each key is matched to an image
//! file from the raw assets directory, and every frame's rectangle is cropped
//! into its own PNG. Frames packed sideways are turned upright by a 270°
//! rotation.

use image::{imageops, ImageError, RgbaImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::models::SpriteFrame;
use crate::output::{save_png, sprite_output_path};
use crate::report::{ExtractReport, OutputKind};

/// Sprite frames per texture key, in scan order.
pub type TextureSprites = BTreeMap<String, Vec<SpriteFrame>>;

/// Number of leading texture key characters that name its raw-assets bucket.
pub const TEXTURE_KEY_PREFIX_LEN: usize = 2;

/// How texture keys are matched to image files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextureMatch {
    /// Key prefix equals the bucket directory (`raw-assets/<kk>/...`)
    #[default]
    Bucket,
    /// Image file stem equals the whole key
    Stem,
}

/// Group frames by their texture key.
pub fn group_by_texture(frames: impl IntoIterator<Item = SpriteFrame>) -> TextureSprites {
    let mut grouped = TextureSprites::new();
    for frame in frames {
        grouped.entry(frame.texture.clone()).or_default().push(frame);
    }
    grouped
}

/// Bucket heuristic: the first two characters of the key equal the first two
/// characters of the image path relative to the raw assets root.
///
/// Raw assets are stored as `<root>/<kk>/<file>` where `kk` starts the
/// texture key, so with a `raw-assets/` root this compares the key against
/// characters 11..13 of the full path. Nothing else ties a key to a file:
/// any image in the same bucket matches.
pub fn texture_file_matches(key: &str, relative_path: &str) -> bool {
    match (key.get(..TEXTURE_KEY_PREFIX_LEN), relative_path.get(..TEXTURE_KEY_PREFIX_LEN)) {
        (Some(key_prefix), Some(path_prefix)) => key_prefix == path_prefix,
        _ => false,
    }
}

fn file_matches(key: &str, file: &Path, root: &Path, mode: TextureMatch) -> bool {
    match mode {
        TextureMatch::Bucket => {
            let relative = file.strip_prefix(root).unwrap_or(file);
            texture_file_matches(key, &relative.to_string_lossy())
        }
        TextureMatch::Stem => file.file_stem().and_then(|s| s.to_str()) == Some(key),
    }
}

/// Match texture keys to image files.
///
/// `files` are scanned in the order given and the last match wins. Keys
/// without a match are left out.
pub fn resolve_texture_files<'k>(
    keys: impl IntoIterator<Item = &'k str>,
    files: &[PathBuf],
    root: &Path,
    mode: TextureMatch,
) -> BTreeMap<String, PathBuf> {
    let mut resolved = BTreeMap::new();
    for key in keys {
        for file in files {
            if file_matches(key, file, root, mode) {
                resolved.insert(key.to_string(), file.clone());
            }
        }
        if !resolved.contains_key(key) {
            debug!("no image file for texture '{}'", key);
        }
    }
    resolved
}

/// Decode a texture image into RGBA, whatever its stored pixel format.
pub fn load_texture(key: &str, path: &Path) -> Result<RgbaImage, ExtractError> {
    match image::open(path) {
        Ok(decoded) => Ok(decoded.to_rgba8()),
        Err(ImageError::IoError(source)) => {
            Err(ExtractError::Io { path: path.to_path_buf(), source })
        }
        Err(ImageError::Unsupported(e)) => Err(ExtractError::UnsupportedImageFormat {
            texture: key.to_string(),
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(e) => Err(ExtractError::decode(format!("texture '{}' ({})", key, path.display()), e)),
    }
}

/// Load every resolved texture, recording the ones that fail.
pub fn load_textures(
    files: &BTreeMap<String, PathBuf>,
    report: &mut ExtractReport,
) -> BTreeMap<String, RgbaImage> {
    let mut textures = BTreeMap::new();
    for (key, path) in files {
        match load_texture(key, path) {
            Ok(image) => {
                debug!(
                    "texture '{}' {}x{} from {}",
                    key,
                    image.width(),
                    image.height(),
                    path.display()
                );
                textures.insert(key.clone(), image);
            }
            Err(e) => report.record_skip(&e),
        }
    }
    textures
}

/// Crop one sprite out of its atlas and turn it upright.
///
/// The crop uses the normalized rect. Rotated frames are then rotated by
/// exactly 270°, giving an image of the frame's display size.
pub fn slice_sprite(atlas: &RgbaImage, frame: &SpriteFrame) -> Result<RgbaImage, ExtractError> {
    let rect = frame.rect;
    let context = || format!("sprite '{}' on texture '{}'", frame.name, frame.texture);

    if rect.width == 0 || rect.height == 0 {
        return Err(ExtractError::malformed(context(), "rect has zero area"));
    }
    if !rect.fits_within(atlas.width(), atlas.height()) {
        return Err(ExtractError::malformed(
            context(),
            format!(
                "rect [{}, {}, {}, {}] exceeds {}x{} texture",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                atlas.width(),
                atlas.height()
            ),
        ));
    }

    let cropped = imageops::crop_imm(atlas, rect.x, rect.y, rect.width, rect.height).to_image();
    if frame.rotated {
        Ok(imageops::rotate270(&cropped))
    } else {
        Ok(cropped)
    }
}

/// Slice every sprite whose texture was loaded and write it to `images_dir`.
///
/// Textures are processed in key order and sprites in scan order; a later
/// sprite with the same name overwrites an earlier one. Returns the number of
/// sprites written.
pub fn slice_atlases(
    sprites: &TextureSprites,
    textures: &BTreeMap<String, RgbaImage>,
    images_dir: &Path,
    report: &mut ExtractReport,
) -> usize {
    let mut written = 0;

    for (key, frames) in sprites {
        let Some(atlas) = textures.get(key) else {
            warn!("texture '{}' not loaded, {} sprites dropped", key, frames.len());
            continue;
        };

        for frame in frames {
            let sprite = match slice_sprite(atlas, frame) {
                Ok(sprite) => sprite,
                Err(e) => {
                    report.record_skip(&e);
                    continue;
                }
            };

            let path = match sprite_output_path(images_dir, &frame.name) {
                Ok(path) => path,
                Err(e) => {
                    report.record_skip(&e);
                    continue;
                }
            };
            match save_png(&sprite, &path) {
                Ok(()) => {
                    report.record_output(OutputKind::Sprite, path);
                    written += 1;
                }
                Err(source) => report.record_skip(&ExtractError::Encode { path, source }),
            }
        }
    }

    info!("sliced {} sprites from {} textures", written, textures.len());
    written
}

//! Sprite frame records scanned out of build output.

use serde::{Deserialize, Deserializer, Serialize};

/// Discriminator carried by sprite frame fragments.
pub const SPRITE_FRAME_TYPE: &str = "cc.SpriteFrame";

/// A pixel rectangle `[x, y, width, height]` in atlas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "[u32; 4]")]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Same origin with width and height exchanged.
    pub fn transposed(self) -> Self {
        Self { width: self.height, height: self.width, ..self }
    }

    /// Exclusive right edge (`x + width`).
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge (`y + height`).
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the rectangle lies fully inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

impl TryFrom<Vec<i64>> for Rect {
    type Error = String;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        if values.len() != 4 {
            return Err(format!("rect must have 4 entries, found {}", values.len()));
        }
        let mut parts = [0u32; 4];
        for (slot, value) in parts.iter_mut().zip(&values) {
            *slot = u32::try_from(*value)
                .map_err(|_| format!("rect entry {} is out of range", value))?;
        }
        Ok(Rect::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl From<Rect> for [u32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x, rect.y, rect.width, rect.height]
    }
}

/// The `rotated` flag is written as `1`/`0` by most builds and as a boolean by some.
/// Only the integer `1` counts as rotated.
fn deserialize_rotated<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RotatedFlag {
        Bool(bool),
        Int(i64),
    }

    Ok(match RotatedFlag::deserialize(deserializer)? {
        RotatedFlag::Bool(flag) => flag,
        RotatedFlag::Int(value) => value == 1,
    })
}

/// The `content` payload of a sprite frame fragment, exactly as stored.
///
/// When `rotated` is set, `rect` holds the sprite's display size, while the
/// pixels in the atlas occupy a region with width and height exchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpriteFrameContent {
    #[serde(alias = "Name")]
    pub name: String,
    pub texture: String,
    pub rect: Rect,
    #[serde(default)]
    pub offset: Vec<f64>,
    #[serde(default, rename = "originalSize")]
    pub original_size: Vec<f64>,
    #[serde(default, rename = "capInsets")]
    pub cap_insets: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_rotated")]
    pub rotated: bool,
}

/// Wrapper object a fragment decodes into: `{"__type__": ..., "content": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteFrameFragment {
    #[serde(rename = "__type__")]
    pub type_name: String,
    pub content: SpriteFrameContent,
}

/// A sprite frame normalized for slicing.
///
/// `rect` is the region to crop from the atlas. It only differs from the stored
/// rect when `rotated` is set, in which case width and height were exchanged
/// once, when converting from [`SpriteFrameContent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteFrame {
    pub name: String,
    pub texture: String,
    pub rect: Rect,
    pub offset: Vec<f64>,
    #[serde(rename = "originalSize")]
    pub original_size: Vec<f64>,
    #[serde(rename = "capInsets")]
    pub cap_insets: Vec<f64>,
    pub rotated: bool,
}

impl From<SpriteFrameContent> for SpriteFrame {
    fn from(content: SpriteFrameContent) -> Self {
        let rect = if content.rotated { content.rect.transposed() } else { content.rect };
        Self {
            name: content.name,
            texture: content.texture,
            rect,
            offset: content.offset,
            original_size: content.original_size,
            cap_insets: content.cap_insets,
            rotated: content.rotated,
        }
    }
}

impl SpriteFrame {
    /// Decode one fragment of the form `{"__type__":"cc.SpriteFrame","content":{...}}`.
    pub fn from_fragment(fragment: &str) -> Result<Self, serde_json::Error> {
        let wrapper: SpriteFrameFragment = serde_json::from_str(fragment)?;
        if wrapper.type_name != SPRITE_FRAME_TYPE {
            return Err(serde::de::Error::custom(format!(
                "expected {} fragment, found {}",
                SPRITE_FRAME_TYPE, wrapper.type_name
            )));
        }
        Ok(wrapper.content.into())
    }

    /// Pixel size of the written sprite: the atlas region, turned upright.
    pub fn output_size(&self) -> (u32, u32) {
        if self.rotated {
            (self.rect.height, self.rect.width)
        } else {
            (self.rect.width, self.rect.height)
        }
    }
}

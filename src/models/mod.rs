//! Data models for records extracted from resource bundles

mod sprite_frame;

pub use sprite_frame::{
    Rect, SpriteFrame, SpriteFrameContent, SpriteFrameFragment, SPRITE_FRAME_TYPE,
};

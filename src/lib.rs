//! resunpack - Library for extracting assets from packed game resource bundles
//!
//! This library provides functionality to:
//! - Walk serialized `cc.*` resource descriptors and write out JSON assets,
//!   scenes and prefabs
//! - Find `cc.SpriteFrame` records embedded in build output text
//! - Slice sprites out of their texture atlases, undoing packer rotation
//! - Read the uuid -> script name table of the build manifest

pub mod alias;
pub mod atlas;
pub mod cli;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod scene;
pub mod walker;

pub use error::ExtractError;
pub use pipeline::{ExtractPipeline, ExtractStage};

//! Extraction pipeline orchestration.
//!
//! Runs the stages in order: manifest scripts, resource walk with scene
//! re-serialization, fragment scan with atlas slicing, then diagnostics.
//! Only setup failures abort a run; everything else is recorded in the
//! report and skipped.

use crate::alias::AliasTable;
use crate::atlas::{group_by_texture, load_textures, resolve_texture_files, slice_atlases};
use crate::context::ExtractContext;
use crate::discovery::{discover_by_extension, DiscoveryError};
use crate::error::ExtractError;
use crate::manifest::ScriptTable;
use crate::output::AssetWriter;
use crate::report::{ExtractReport, OutputKind};
use crate::scanner::scan_file;
use crate::scene::write_scene_documents;
use crate::walker::{has_scene_or_prefab, SpriteFrameIndex, WalkContext, Walker};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Which part of the extraction to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    /// Scripts, assets, sprites and diagnostics
    All,
    /// JSON assets, scenes and prefabs
    Assets,
    /// Sprite slicing
    Sprites,
}

impl ExtractStage {
    fn includes_assets(self) -> bool {
        matches!(self, ExtractStage::All | ExtractStage::Assets)
    }

    fn includes_sprites(self) -> bool {
        matches!(self, ExtractStage::All | ExtractStage::Sprites)
    }
}

/// State accumulated by the resource walk.
#[derive(Debug, Default)]
pub struct WalkState {
    pub aliases: AliasTable,
    pub frames: SpriteFrameIndex,
}

/// Extraction pipeline.
#[derive(Debug)]
pub struct ExtractPipeline {
    context: ExtractContext,
    walker: Walker,
}

impl ExtractPipeline {
    /// Create a pipeline with the default node handlers.
    pub fn new(context: ExtractContext) -> Self {
        Self { context, walker: Walker::with_default_handlers() }
    }

    /// Replace the walker, e.g. to register extra handlers.
    pub fn with_walker(mut self, walker: Walker) -> Self {
        self.walker = walker;
        self
    }

    pub fn context(&self) -> &ExtractContext {
        &self.context
    }

    /// Run the extraction.
    ///
    /// Returns `Err` only for `ExtractError::Setup`.
    pub fn run(&self, stage: ExtractStage) -> Result<ExtractReport, ExtractError> {
        let start = Instant::now();
        let mut report = ExtractReport::new();

        let writes_json = stage.includes_assets() || self.writes_diagnostics(stage);
        if writes_json {
            create_output_dir(&self.context.out_dir())?;
        }
        if stage.includes_sprites() {
            create_output_dir(&self.context.images_dir())?;
        }

        let scripts = if stage == ExtractStage::All {
            self.load_scripts(&mut report)
        } else {
            ScriptTable::new()
        };

        let mut state = WalkState::default();
        if stage.includes_assets() {
            state = self.extract_assets(&mut report)?;
        }

        if stage.includes_sprites() {
            self.extract_sprites(&mut report)?;
        }

        if self.writes_diagnostics(stage) {
            self.write_diagnostics(&state, &scripts, &mut report);
        }

        report.aliases = state.aliases.len();
        report.frames_indexed = state.frames.len();
        report.scripts = scripts.len();

        Ok(report.with_duration(start.elapsed()))
    }

    fn writes_diagnostics(&self, stage: ExtractStage) -> bool {
        stage == ExtractStage::All && self.context.diagnostics_enabled()
    }

    /// Load the manifest script table.
    ///
    /// A missing or unreadable manifest is recorded and yields an empty table.
    pub fn load_scripts(&self, report: &mut ExtractReport) -> ScriptTable {
        let path = self.context.manifest_path();
        match ScriptTable::load(&path) {
            Ok(table) => {
                info!("{} scripts in {}", table.len(), path.display());
                table
            }
            Err(e) => {
                report.record_skip(&e);
                ScriptTable::new()
            }
        }
    }

    /// Walk every resource file, writing JSON assets, scenes and prefabs.
    pub fn extract_assets(&self, report: &mut ExtractReport) -> Result<WalkState, ExtractError> {
        let resources = self.context.resources_dir();
        let extensions = &self.context.config().scan.descriptor_extensions;
        let files = self.discover(&resources, extensions, report)?;
        info!("walking {} resource files in {}", files.len(), resources.display());

        let writer = self.context.asset_writer();
        let mut state = WalkState::default();
        for file in &files {
            self.walk_file(file, &writer, &mut state, report);
        }
        for (uuid, name) in state.aliases.iter() {
            debug!("alias {} -> {}", uuid, name);
        }
        Ok(state)
    }

    /// Walk one resource file.
    ///
    /// Unreadable or undecodable files are recorded and skipped.
    fn walk_file(
        &self,
        file: &Path,
        writer: &AssetWriter,
        state: &mut WalkState,
        report: &mut ExtractReport,
    ) {
        debug!("walking {}", file.display());

        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(source) => {
                report.record_skip(&ExtractError::Io { path: file.to_path_buf(), source });
                return;
            }
        };
        let root: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(root) => root,
            Err(e) => {
                report.record_skip(&ExtractError::decode(format!("'{}'", file.display()), e));
                return;
            }
        };

        let mut ctx = WalkContext::new(file, writer, &mut state.aliases, report);
        let nodes = self.walker.collect(&root, &mut ctx);
        report.files_walked += 1;

        state.frames.add_nodes(&nodes, file);
        if has_scene_or_prefab(&nodes) {
            write_scene_documents(&root, file, writer, report);
        }
    }

    /// Scan descriptors for sprite frames and slice them out of their atlases.
    ///
    /// Returns the number of sprites written.
    pub fn extract_sprites(&self, report: &mut ExtractReport) -> Result<usize, ExtractError> {
        let scan = &self.context.config().scan;

        let program = self.context.program_dir();
        let descriptors = self.discover(&program, &scan.descriptor_extensions, report)?;
        let mut frames = Vec::new();
        for descriptor in &descriptors {
            match scan_file(descriptor) {
                Ok(outcome) => {
                    for e in &outcome.errors {
                        report.record_skip(e);
                    }
                    frames.extend(outcome.frames);
                }
                Err(e) => report.record_skip(&e),
            }
        }
        report.frames_scanned = frames.len();
        info!(
            "{} sprite frames in {} files under {}",
            frames.len(),
            descriptors.len(),
            program.display()
        );

        let sprites = group_by_texture(frames);
        let raw_assets = self.context.raw_assets_dir();
        let images = self.discover(&raw_assets, &scan.image_extensions, report)?;
        let files = resolve_texture_files(
            sprites.keys().map(String::as_str),
            &images,
            &raw_assets,
            scan.texture_match,
        );
        info!("{} of {} textures matched an image", files.len(), sprites.len());

        let textures = load_textures(&files, report);
        Ok(slice_atlases(&sprites, &textures, &self.context.images_dir(), report))
    }

    /// Dump the alias, script, and sprite frame tables into the output directory.
    fn write_diagnostics(
        &self,
        state: &WalkState,
        scripts: &ScriptTable,
        report: &mut ExtractReport,
    ) {
        let writer = self.context.asset_writer();
        let results = [
            writer.write("aliases", ".json", &state.aliases),
            writer.write("scripts", ".json", scripts),
            writer.write("sprite_frames", ".json", &state.frames),
        ];
        for result in results {
            match result {
                Ok(path) => report.record_output(OutputKind::Diagnostic, path),
                Err(e) => report.record_skip(&e),
            }
        }
    }

    /// Discover input files; a missing directory is recorded and yields nothing.
    fn discover(
        &self,
        dir: &Path,
        extensions: &[String],
        report: &mut ExtractReport,
    ) -> Result<Vec<PathBuf>, ExtractError> {
        match discover_by_extension(dir, extensions) {
            Ok(files) => Ok(files),
            Err(DiscoveryError::MissingRoot(path)) => {
                warn!("input directory {} not found", path.display());
                let source = io::ErrorKind::NotFound.into();
                report.record_skip(&ExtractError::Io { path, source });
                Ok(Vec::new())
            }
            Err(e) => Err(ExtractError::Setup(e.to_string())),
        }
    }
}

fn create_output_dir(dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dir).map_err(|e| {
        ExtractError::Setup(format!("cannot create output directory {}: {}", dir.display(), e))
    })
}

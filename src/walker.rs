//! Generic asset tree walker
//!
//! Resource descriptors are untyped JSON. An object's meaning is given at
//! runtime by its `__type__` field, so the walker only tells arrays, objects
//! and scalars apart and leaves everything else to a dispatch table keyed by
//! type name. Unknown types fall through without effect.
//!
//! Every object reachable from the root is collected in depth-first pre-order.
//! Handler failures are recovered at the node they happened on.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::trace;
use serde_json::{Map, Value};

use crate::alias::AliasTable;
use crate::error::ExtractError;
use crate::output::AssetWriter;
use crate::report::{ExtractReport, OutputKind};

/// An untyped object node.
pub type Node = Map<String, Value>;

/// Handler run for every node of a registered type.
pub type NodeHandler = fn(&Node, &mut WalkContext<'_>) -> Result<(), ExtractError>;

/// Key holding an object's type name.
pub const TYPE_KEY: &str = "__type__";

pub const JSON_ASSET: &str = "cc.JsonAsset";
pub const SPRITE_ATLAS: &str = "cc.SpriteAtlas";
pub const SPRITE_FRAME: &str = crate::models::SPRITE_FRAME_TYPE;
pub const SCENE_ASSET: &str = "cc.SceneAsset";
pub const PREFAB: &str = "cc.Prefab";

/// Types that are recognized but have no extraction of their own yet.
pub const CLASSIFIED_TYPES: &[&str] = &[
    "cc.Sprite",
    "cc.ScrollView",
    SPRITE_FRAME,
    "cc.AnimationClip",
    "cc.Node",
    "cc.Label",
    "cc.Animation",
    SCENE_ASSET,
    "cc.Scene",
    "cc.PrivateNode",
    PREFAB,
    "cc.AudioClip",
    "cc.ProgressBar",
    "cc.RichText",
];

/// The type name of an object node, if it has one.
pub fn type_of(node: &Node) -> Option<&str> {
    node.get(TYPE_KEY).and_then(Value::as_str)
}

/// Look up a string field, failing with a malformed-asset error.
pub fn require_str<'n>(node: &'n Node, key: &str, context: &str) -> Result<&'n str, ExtractError> {
    match node.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => {
            Err(ExtractError::malformed(context, format!("field '{}' is not a string", key)))
        }
        None => Err(ExtractError::malformed(context, format!("missing field '{}'", key))),
    }
}

/// Look up an object field, failing with a malformed-asset error.
pub fn require_object<'n>(
    node: &'n Node,
    key: &str,
    context: &str,
) -> Result<&'n Node, ExtractError> {
    match node.get(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => {
            Err(ExtractError::malformed(context, format!("field '{}' is not an object", key)))
        }
        None => Err(ExtractError::malformed(context, format!("missing field '{}'", key))),
    }
}

/// State shared by every handler during one walk.
pub struct WalkContext<'r> {
    source: PathBuf,
    depth: usize,
    pub writer: &'r AssetWriter,
    pub aliases: &'r mut AliasTable,
    pub report: &'r mut ExtractReport,
}

impl<'r> WalkContext<'r> {
    pub fn new(
        source: impl Into<PathBuf>,
        writer: &'r AssetWriter,
        aliases: &'r mut AliasTable,
        report: &'r mut ExtractReport,
    ) -> Self {
        Self { source: source.into(), depth: 0, writer, aliases, report }
    }

    /// File the walked tree was decoded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Depth of the node currently being handled.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Error context naming the current file, node type and depth.
    pub fn location(&self, type_name: &str) -> String {
        format!("'{}' ({} at depth {})", self.source.display(), type_name, self.depth)
    }
}

/// Writes a JSON asset's `json` payload to `<out>/<_name>.json`.
fn handle_json_asset(node: &Node, ctx: &mut WalkContext<'_>) -> Result<(), ExtractError> {
    let context = ctx.location(JSON_ASSET);
    let name = require_str(node, "_name", &context)?;
    let payload = node
        .get("json")
        .ok_or_else(|| ExtractError::malformed(&context, "missing field 'json'"))?;

    let path = ctx.writer.write(name, ".json", payload)?;
    ctx.report.record_output(OutputKind::JsonAsset, path);
    Ok(())
}

/// Records `uuid -> sprite name` for every `_spriteFrames` entry.
///
/// A bad entry is skipped on its own; the rest of the atlas is still read.
fn handle_sprite_atlas(node: &Node, ctx: &mut WalkContext<'_>) -> Result<(), ExtractError> {
    let context = ctx.location(SPRITE_ATLAS);
    let frames = require_object(node, "_spriteFrames", &context)?;

    for (sprite_name, reference) in frames {
        let uuid = reference.as_object().and_then(|r| r.get("__uuid__")).and_then(Value::as_str);
        match uuid {
            Some(uuid) => {
                ctx.aliases.insert(uuid, sprite_name.as_str());
            }
            None => ctx.report.record_skip(&ExtractError::malformed(
                &context,
                format!("sprite '{}' has no string '__uuid__' reference", sprite_name),
            )),
        }
    }
    Ok(())
}

fn handle_classified(_node: &Node, _ctx: &mut WalkContext<'_>) -> Result<(), ExtractError> {
    Ok(())
}

/// Recursive walker with a type-name dispatch table.
#[derive(Clone)]
pub struct Walker {
    handlers: HashMap<&'static str, NodeHandler>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("Walker").field("handlers", &types).finish()
    }
}

impl Walker {
    /// A walker that only collects nodes.
    pub fn empty() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// JSON asset and sprite atlas extraction, plus every classified type.
    pub fn with_default_handlers() -> Self {
        let mut walker = Self::empty();
        for type_name in CLASSIFIED_TYPES {
            walker.register(*type_name, handle_classified);
        }
        walker.register(JSON_ASSET, handle_json_asset);
        walker.register(SPRITE_ATLAS, handle_sprite_atlas);
        walker
    }

    /// Register a handler, returning the one it replaced.
    pub fn register(
        &mut self,
        type_name: &'static str,
        handler: NodeHandler,
    ) -> Option<NodeHandler> {
        self.handlers.insert(type_name, handler)
    }

    /// Whether a type name has a handler.
    pub fn handles(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }

    /// Visit `node` and everything below it.
    ///
    /// Objects are pushed onto `nodes` before their handler runs and before
    /// their own values are visited. Arrays and object values are visited at
    /// `depth + 1`. Scalars are ignored.
    pub fn walk<'a>(
        &self,
        node: &'a Value,
        depth: usize,
        nodes: &mut Vec<&'a Node>,
        ctx: &mut WalkContext<'_>,
    ) {
        match node {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, depth + 1, nodes, ctx);
                }
            }
            Value::Object(map) => {
                nodes.push(map);
                self.dispatch(map, depth, ctx);
                for value in map.values() {
                    self.walk(value, depth + 1, nodes, ctx);
                }
            }
            _ => {}
        }
    }

    /// Walk a whole tree from depth 1 and return the collected nodes.
    pub fn collect<'a>(&self, root: &'a Value, ctx: &mut WalkContext<'_>) -> Vec<&'a Node> {
        let mut nodes = Vec::new();
        self.walk(root, 1, &mut nodes, ctx);
        nodes
    }

    fn dispatch(&self, node: &Node, depth: usize, ctx: &mut WalkContext<'_>) {
        let Some(type_name) = type_of(node) else {
            return;
        };

        match self.handlers.get(type_name) {
            Some(handler) => {
                ctx.depth = depth;
                ctx.report.count_node_type(type_name);
                if let Err(e) = handler(node, ctx) {
                    ctx.report.record_skip(&e);
                }
            }
            None => {
                trace!("{}: unhandled type {} at depth {}", ctx.source.display(), type_name, depth)
            }
        }
    }
}

/// Where each walked sprite frame node was found, by sprite name.
///
/// A node is indexed under its `_name` and, when it carries a `content`
/// record, under `content.name` (or `content.Name`) as well. Later files overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SpriteFrameIndex {
    entries: BTreeMap<String, PathBuf>,
}

impl SpriteFrameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the sprite frame nodes among `nodes`, all taken from `source`.
    pub fn add_nodes(&mut self, nodes: &[&Node], source: &Path) {
        for node in nodes.iter().filter(|n| type_of(n) == Some(SPRITE_FRAME)) {
            if let Some(name) = node.get("_name").and_then(Value::as_str) {
                self.entries.insert(name.to_string(), source.to_path_buf());
            }
            let content_name = node
                .get("content")
                .and_then(Value::as_object)
                .and_then(|c| c.get("name").or_else(|| c.get("Name")))
                .and_then(Value::as_str);
            if let Some(name) = content_name {
                self.entries.insert(name.to_string(), source.to_path_buf());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether any collected node is a scene or prefab asset.
pub fn has_scene_or_prefab(nodes: &[&Node]) -> bool {
    nodes.iter().any(|n| matches!(type_of(n), Some(SCENE_ASSET) | Some(PREFAB)))
}

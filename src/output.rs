//! PNG and JSON output, and output path generation

use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::ExtractError;

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
    /// JSON serialization error
    Json(serde_json::Error),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            OutputError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Json(e)
    }
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image as a PNG file, whatever the path's extension.
///
/// Parent directories are created when missing.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Serialize a value as pretty-printed JSON using `indent` spaces per level.
pub fn to_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    indent: usize,
) -> Result<Vec<u8>, OutputError> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Write a value as pretty-printed JSON, truncating any existing file.
pub fn write_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    indent: usize,
) -> Result<(), OutputError> {
    let bytes = to_pretty_json(value, indent)?;
    ensure_parent(path)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Writes JSON assets into one output directory with a fixed indent.
#[derive(Debug, Clone)]
pub struct AssetWriter {
    out_dir: PathBuf,
    indent: usize,
}

impl AssetWriter {
    pub fn new(out_dir: impl Into<PathBuf>, indent: usize) -> Self {
        Self { out_dir: out_dir.into(), indent }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Write `value` to `{out_dir}/{name}{suffix}` and return the path written.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        suffix: &str,
        value: &T,
    ) -> Result<PathBuf, ExtractError> {
        let path = asset_output_path(&self.out_dir, name, suffix)?;
        match write_pretty_json(value, &path, self.indent) {
            Ok(()) => Ok(path),
            Err(source) => Err(ExtractError::Encode { path, source }),
        }
    }
}

/// Check that an asset name taken from bundle data names a single file.
///
/// Anything other than one normal path component is rejected, so the output
/// cannot land outside its directory.
pub fn check_output_name(name: &str) -> Result<(), ExtractError> {
    let mut components = Path::new(name).components();
    let single_file = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_file || name.contains(['/', '\\']) {
        return Err(ExtractError::malformed(
            format!("output name '{}'", name),
            "must be a plain file name",
        ));
    }
    Ok(())
}

/// Output path for a cropped sprite: `{images_dir}/{name}.png`.
pub fn sprite_output_path(images_dir: &Path, sprite_name: &str) -> Result<PathBuf, ExtractError> {
    check_output_name(sprite_name)?;
    Ok(images_dir.join(format!("{}.png", sprite_name)))
}

/// Output path for a JSON asset: `{out_dir}/{name}{suffix}`.
///
/// `suffix` is `.json`, `.fire.json` or `.prefab.json`.
pub fn asset_output_path(
    out_dir: &Path,
    asset_name: &str,
    suffix: &str,
) -> Result<PathBuf, ExtractError> {
    check_output_name(asset_name)?;
    Ok(out_dir.join(format!("{}{}", asset_name, suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use serde_json::json;

    #[test]
    fn test_sprite_output_path() {
        let path = sprite_output_path(Path::new("images"), "hero").unwrap();
        assert_eq!(path, PathBuf::from("images/hero.png"));
    }

    #[test]
    fn test_asset_output_path_suffixes() {
        let out = Path::new("out");
        assert_eq!(asset_output_path(out, "config", ".json").unwrap(), out.join("config.json"));
        assert_eq!(
            asset_output_path(out, "Main", ".fire.json").unwrap(),
            out.join("Main.fire.json")
        );
        assert_eq!(
            asset_output_path(out, "Enemy", ".prefab.json").unwrap(),
            out.join("Enemy.prefab.json")
        );
    }

    #[test]
    fn test_output_names_must_stay_in_directory() {
        for name in ["/abs", "/tmp/evil", "../x", "..", ".", "a/b", "a\\b", ""] {
            let err = sprite_output_path(Path::new("images"), name).unwrap_err();
            assert_eq!(err.kind(), "malformed", "name {:?}", name);
            assert!(asset_output_path(Path::new("out"), name, ".json").is_err(), "name {:?}", name);
        }
    }

    #[test]
    fn test_output_names_with_dots_allowed() {
        let path = sprite_output_path(Path::new("images"), "btn.pressed..v2").unwrap();
        assert_eq!(path, PathBuf::from("images/btn.pressed..v2.png"));
        assert!(check_output_name("...").is_ok());
    }

    #[test]
    fn test_asset_writer_rejects_escaping_name() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let writer = AssetWriter::new(dir.path().join("out"), 4);

        let err = writer.write("../escaped", ".json", &json!({"a": 1})).unwrap_err();

        assert_eq!(err.kind(), "malformed");
        assert!(!dir.path().join("escaped.json").exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_to_pretty_json_four_space_indent() {
        let value = json!({"a": [1, 2]});
        let text = String::from_utf8(to_pretty_json(&value, 4).unwrap()).unwrap();
        assert_eq!(text, "{\n    \"a\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn test_to_pretty_json_custom_indent() {
        let value = json!({"k": true});
        let text = String::from_utf8(to_pretty_json(&value, 2).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"k\": true\n}");
    }

    #[test]
    fn test_write_pretty_json_round_trip() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/asset.json");
        let value = json!({"levels": [{"id": 1, "name": "forest"}], "version": 2.5});

        write_pretty_json(&value, &path, 4).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_asset_writer_writes_under_out_dir() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let writer = AssetWriter::new(dir.path().join("out"), 4);
        let path = writer.write("Level1", ".fire.json", &json!([{"a": 1}])).unwrap();

        assert_eq!(path, dir.path().join("out/Level1.fire.json"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"a\": 1"));
    }

    #[test]
    fn test_save_png_basic() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 0]));

        let result = save_png(&image, &path);
        assert!(result.is_ok());
        assert!(path.exists());

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*loaded.get_pixel(1, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*loaded.get_pixel(0, 1), Rgba([0, 0, 255, 255]));
        assert_eq!(*loaded.get_pixel(1, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_save_png_creates_parent_dirs() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/test.png");

        let image = RgbaImage::new(1, 1);
        assert!(save_png(&image, &path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_save_png_overwrites_existing() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.png");

        save_png(&RgbaImage::new(4, 4), &path).unwrap();
        save_png(&RgbaImage::new(2, 3), &path).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (2, 3));
    }
}

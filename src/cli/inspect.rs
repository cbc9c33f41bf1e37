//! Inspection commands (scripts, scan)

use std::path::Path;
use std::process::ExitCode;

use super::extract::load_context;
use super::{PathArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::manifest::ScriptTable;
use crate::scanner::scan_file;

/// Print the manifest's uuid -> script name table, one pair per line.
pub fn run_scripts(paths: &PathArgs) -> ExitCode {
    let context = match load_context(paths, false) {
        Ok(context) => context,
        Err(code) => return code,
    };

    let table = match ScriptTable::load(&context.manifest_path()) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    for (uuid, name) in table.iter() {
        println!("{}\t{}", uuid, name);
    }
    eprintln!("{} scripts", table.len());
    ExitCode::from(EXIT_SUCCESS)
}

/// List the sprite frames found in one file, then the fragments that failed.
pub fn run_scan(input: &Path) -> ExitCode {
    let outcome = match scan_file(input) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    for frame in &outcome.frames {
        let rect = frame.rect;
        let (width, height) = frame.output_size();
        println!(
            "{}\ttexture={}\trect=[{}, {}, {}, {}]\trotated={}\tsize={}x{}",
            frame.name, frame.texture, rect.x, rect.y, rect.width, rect.height, frame.rotated,
            width, height
        );
    }
    for e in &outcome.errors {
        eprintln!("skipped: {}", e);
    }
    eprintln!("{} sprite frames, {} skipped", outcome.frames.len(), outcome.errors.len());
    ExitCode::from(EXIT_SUCCESS)
}

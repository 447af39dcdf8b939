use crate::error::{IoContext, Result, SgError};
use crate::types::ConvertibleEntry;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CONTENT_EXTENSION: &str = ".md";
pub const OUTPUT_EXTENSION: &str = ".html";

/// What the walk did besides queueing conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    pub entries: Vec<ConvertibleEntry>,
    pub copied: usize,
    pub directories: usize,
}

/// Mirrors `input_dir` into `output_dir`: every directory is recreated, every
/// asset is copied byte for byte, and every `.md` file is queued for
/// conversion to the matching `.html` path instead of being copied.
pub fn walk_input(input_dir: &Path, output_dir: &Path) -> Result<WalkOutcome> {
    if !input_dir.is_dir() {
        return Err(SgError::WalkDir {
            path: input_dir.to_path_buf(),
            message: "input directory does not exist or is not a directory".to_string(),
        });
    }

    fs::create_dir_all(output_dir).io_context("creating output directory", output_dir)?;

    let input_root = std::path::absolute(input_dir).io_context("resolving", input_dir)?;
    let output_root = std::path::absolute(output_dir).io_context("resolving", output_dir)?;

    let mut outcome = WalkOutcome::default();

    for entry in WalkDir::new(&input_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|error| SgError::WalkDir {
            path: input_root.clone(),
            message: error.to_string(),
        })?;

        let path = entry.path();
        let relative = path
            .strip_prefix(&input_root)
            .map_err(|_| SgError::InvalidPath {
                path: path.to_path_buf(),
            })?;

        if path.is_dir() {
            let dest = output_root.join(relative);
            fs::create_dir_all(&dest).io_context("creating directory", &dest)?;
            outcome.directories += 1;
            continue;
        }

        if let Some(dest) = content_destination(relative) {
            let entry = ConvertibleEntry {
                source: path.to_path_buf(),
                destination: output_root.join(dest),
            };
            debug!("Queued {} for conversion", relative.display());
            outcome.entries.push(entry);
            continue;
        }

        let dest = output_root.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).io_context("creating directory", parent)?;
        }
        fs::copy(path, &dest).io_context("copying asset", path)?;
        debug!("Copied {}", relative.display());
        outcome.copied += 1;
    }

    Ok(outcome)
}

/// The `.html` path for a content file, or `None` when the file is an asset.
pub fn content_destination(relative: &Path) -> Option<PathBuf> {
    let filename = relative.file_name()?.to_str()?;
    let stem = filename.strip_suffix(CONTENT_EXTENSION)?;
    Some(relative.with_file_name(format!("{stem}{OUTPUT_EXTENSION}")))
}

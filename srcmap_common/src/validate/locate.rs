//! Finding pipeline artifacts inside a build-output tree.
//!
//! Step directories are named `<index>-<StepName>`; a larger index is a later
//! stage of the flow.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::validate::ArtifactPatterns;

/// Files under `root` whose name ends with `suffix`, in sorted traversal order.
fn files_with_suffix(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix))
        {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Locates the synthesis JSON netlist.
///
/// Suffixes are tried in order; the first one with any match wins. Among its
/// matches a file below a directory mentioning the synthesis marker is
/// preferred, otherwise the first in traversal order is taken.
pub fn find_structured_netlist(root: &Path, patterns: &ArtifactPatterns) -> Result<Option<PathBuf>> {
    for suffix in &patterns.structured_suffixes {
        let candidates = files_with_suffix(root, suffix)?;
        if candidates.is_empty() {
            debug!("No '*{}' files under {}", suffix, root.display());
            continue;
        }

        let marker = patterns.synthesis_marker.to_lowercase();
        let preferred = candidates.iter().find(|path| {
            path.strip_prefix(root)
                .unwrap_or(path.as_path())
                .parent()
                .is_some_and(|dir| dir.to_string_lossy().to_lowercase().contains(&marker))
        });

        return Ok(preferred.or(candidates.first()).cloned());
    }

    Ok(None)
}

/// Locates the textual netlist of the latest pipeline step.
pub fn find_final_netlist(root: &Path, patterns: &ArtifactPatterns) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<(u32, PathBuf)> = files_with_suffix(root, &patterns.final_suffix)?
        .into_iter()
        .filter(|path| {
            let name = path.to_string_lossy();
            !patterns
                .final_excluded_suffixes
                .iter()
                .any(|excluded| name.ends_with(excluded.as_str()))
        })
        .map(|path| (step_index(root, &path), path))
        .collect();

    for (index, path) in &candidates {
        debug!("Final netlist candidate {} (step {})", path.display(), index);
    }

    // Stable, so equal indices keep traversal order.
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(candidates.into_iter().next().map(|(_, path)| path))
}

/// Step index of the nearest enclosing `<index>-<StepName>` directory, or 0.
pub fn step_index(root: &Path, path: &Path) -> u32 {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .rev()
        .filter_map(|component| {
            let name = component.as_os_str().to_str()?;
            let (prefix, _) = name.split_once('-')?;
            prefix.parse().ok()
        })
        .next()
        .unwrap_or(0)
}

//! Paths of the artifacts a synthesis run leaves next to each other.

use std::path::{Path, PathBuf};

/// Suffix appended to the textual netlist's name when the same run writes JSON.
pub const STRUCTURED_SUFFIX: &str = ".json";

/// True when `path` names a JSON netlist.
pub fn is_structured_netlist(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Returns the textual netlist written alongside `structured`, if it exists.
///
/// `design.nl.v.json` pairs with `design.nl.v` in the same directory.
pub fn sibling_netlist_path(structured: &Path) -> Option<PathBuf> {
    let name = structured.file_name()?.to_str()?;
    let stem = name.strip_suffix(STRUCTURED_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }

    let sibling = structured.with_file_name(stem);
    sibling.is_file().then_some(sibling)
}

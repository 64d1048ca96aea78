use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SrcMapError};
use crate::sideband::{CellRecord, Sideband, SidebandMetadata};
use crate::verilog::{ParsedCell, normalize_type, parse_netlist_file};
use crate::yosys::{YosysDesign, sibling_netlist_path};

/// Where to find the textual netlist written by the same synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiblingNetlist {
    /// Look next to the structured netlist, by stripping its `.json` suffix.
    #[default]
    Auto,
    /// Use this file; it must exist.
    Explicit(PathBuf),
    /// Keep the structured names.
    Disabled,
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Source of the textual names used for cross-referencing.
    pub sibling: SiblingNetlist,
}

impl ExtractOptions {
    /// Defaults: sibling found by convention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cross-reference against `path` instead of the conventional sibling.
    pub fn with_sibling(mut self, path: impl Into<PathBuf>) -> Self {
        self.sibling = SiblingNetlist::Explicit(path.into());
        self
    }

    /// Skip cross-referencing entirely.
    pub fn without_sibling(mut self) -> Self {
        self.sibling = SiblingNetlist::Disabled;
        self
    }
}

/// First pair that disagreed during positional pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    /// Zero-based index of the pair.
    pub position: usize,
    /// Name in the structured netlist.
    pub structured_name: String,
    /// Type in the structured netlist.
    pub structured_type: String,
    /// Name in the textual netlist.
    pub textual_name: String,
    /// Type in the textual netlist.
    pub textual_type: String,
}

/// Outcome of pairing structured cells with textual instantiations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrossReference {
    /// Every structured name was replaced by its textual counterpart.
    Applied {
        /// Number of renamed cells.
        cells: usize,
    },
    /// No textual sibling was available.
    NoSibling,
    /// The two netlists list a different number of cells.
    CountMismatch {
        /// Cells in the structured netlist.
        structured: usize,
        /// Instantiations in the textual netlist.
        textual: usize,
    },
    /// The textual netlist instantiates one name more than once.
    DuplicateName {
        /// First repeated instance name.
        name: String,
    },
    /// Some positional pairs disagree on the cell type.
    TypeMismatch {
        /// Number of disagreeing pairs.
        mismatches: usize,
        /// The earliest disagreeing pair.
        first: TypeMismatch,
    },
}

impl CrossReference {
    /// True when the textual names were adopted.
    pub fn is_applied(&self) -> bool {
        matches!(self, CrossReference::Applied { .. })
    }

    /// Short reason the structured names were kept, if they were.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            CrossReference::Applied { .. } => None,
            CrossReference::NoSibling => Some("no textual sibling"),
            CrossReference::CountMismatch { .. } => Some("count mismatch"),
            CrossReference::DuplicateName { .. } => Some("duplicate textual name"),
            CrossReference::TypeMismatch { .. } => Some("type mismatch"),
        }
    }
}

impl fmt::Display for CrossReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossReference::Applied { cells } => {
                write!(f, "applied to {cells} cells")
            }
            CrossReference::NoSibling => write!(f, "skipped: no textual sibling"),
            CrossReference::CountMismatch {
                structured,
                textual,
            } => write!(
                f,
                "skipped: count mismatch ({structured} structured vs {textual} textual cells)"
            ),
            CrossReference::DuplicateName { name } => {
                write!(f, "skipped: duplicate textual name '{name}'")
            }
            CrossReference::TypeMismatch { mismatches, first } => write!(
                f,
                "skipped: type mismatch ({mismatches} pairs disagree, first at #{}: {} '{}' vs {} '{}')",
                first.position,
                first.structured_name,
                first.structured_type,
                first.textual_name,
                first.textual_type
            ),
        }
    }
}

/// A sideband together with how its keys were chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The extracted records and counts.
    pub sideband: Sideband,
    /// Whether the keys are textual or structured names, and why.
    pub cross_reference: CrossReference,
}

/// Builds a sideband from a Yosys JSON netlist on disk.
///
/// # Errors
///
/// Fails when the JSON cannot be read or parsed, when an explicitly requested
/// sibling is missing or unreadable, or when a module repeats a cell name.
pub fn extract_sideband(structured: &Path, options: &ExtractOptions) -> Result<Extraction> {
    info!("Reading structured netlist from {}", structured.display());
    let design = YosysDesign::read_from(structured)?;

    let sibling = match &options.sibling {
        SiblingNetlist::Disabled => None,
        SiblingNetlist::Explicit(path) => {
            if !path.is_file() {
                return Err(SrcMapError::SiblingNotFound { path: path.clone() });
            }
            Some(path.clone())
        }
        SiblingNetlist::Auto => {
            let found = sibling_netlist_path(structured);
            if found.is_none() {
                info!(
                    "No textual sibling next to {}; keeping structured names",
                    structured.display()
                );
            }
            found
        }
    };

    let textual = match &sibling {
        Some(path) => {
            info!("Reading textual sibling netlist from {}", path.display());
            Some(parse_netlist_file(path)?)
        }
        None => None,
    };

    let extraction = extract_from_design(&design, textual.as_deref())?;
    let meta = &extraction.sideband.metadata;
    info!(
        "Extracted {}/{} cells with source spans ({:.1}% coverage)",
        meta.annotated_cells, meta.total_cells, meta.coverage_pct
    );
    Ok(extraction)
}

/// Builds a sideband from an already parsed design.
///
/// When `textual` is given, structured names are swapped for the textual
/// names only if [`verify_correspondence`] accepts the pairing.
///
/// # Errors
///
/// Returns [`SrcMapError::DuplicateCell`] when one module names two cells
/// identically.
pub fn extract_from_design(
    design: &YosysDesign,
    textual: Option<&[ParsedCell]>,
) -> Result<Extraction> {
    let mut entries: Vec<(String, CellRecord)> = Vec::new();

    for (module_name, module) in design.design_units() {
        debug!("Collecting {} cells from module {}", module.cells.len(), module_name);
        let mut seen = HashSet::with_capacity(module.cells.len());
        for (cell_name, cell) in module.cells.iter() {
            if !seen.insert(cell_name) {
                return Err(SrcMapError::DuplicateCell {
                    module: module_name.to_string(),
                    cell: cell_name.to_string(),
                });
            }
            entries.push((
                cell_name.to_string(),
                CellRecord::new(cell.cell_type.as_str(), cell.source_span().map(str::to_owned)),
            ));
        }
    }

    let total = entries.len();
    let annotated = entries.iter().filter(|(_, r)| r.is_annotated()).count();

    let cross_reference = match textual {
        Some(textual) => verify_correspondence(&entries, textual),
        None => CrossReference::NoSibling,
    };

    match (&cross_reference, textual) {
        (CrossReference::Applied { .. }, Some(textual)) => {
            for ((name, _), parsed) in entries.iter_mut().zip(textual) {
                name.clone_from(&parsed.instance_name);
            }
            info!("Cross-reference {}", cross_reference);
        }
        (CrossReference::NoSibling, _) => {}
        _ => warn!("Cross-reference {}", cross_reference),
    }

    let mut cells = IndexMap::with_capacity(entries.len());
    for (name, record) in entries {
        if cells.insert(name.clone(), record).is_some() {
            warn!(
                "Cell name '{}' appears in more than one module; keeping the last",
                name
            );
        }
    }

    Ok(Extraction {
        sideband: Sideband::new(cells, SidebandMetadata::new(total, annotated)),
        cross_reference,
    })
}

/// Decides whether structured and textual cells may be paired by position.
///
/// Pairing is accepted only when both lists have the same length, the textual
/// names are unique, and every pair agrees on the normalized cell type.
pub fn verify_correspondence(
    structured: &[(String, CellRecord)],
    textual: &[ParsedCell],
) -> CrossReference {
    if structured.len() != textual.len() {
        return CrossReference::CountMismatch {
            structured: structured.len(),
            textual: textual.len(),
        };
    }

    let mut names = HashSet::with_capacity(textual.len());
    if let Some(repeated) = textual
        .iter()
        .find(|parsed| !names.insert(parsed.instance_name.as_str()))
    {
        return CrossReference::DuplicateName {
            name: repeated.instance_name.clone(),
        };
    }

    let mut mismatches = structured
        .iter()
        .zip(textual)
        .enumerate()
        .filter(|(_, ((_, record), parsed))| {
            normalize_type(&record.cell_type) != normalize_type(&parsed.cell_type)
        });

    let Some((position, ((name, record), parsed))) = mismatches.next() else {
        return CrossReference::Applied {
            cells: structured.len(),
        };
    };

    CrossReference::TypeMismatch {
        mismatches: 1 + mismatches.count(),
        first: TypeMismatch {
            position,
            structured_name: name.clone(),
            structured_type: record.cell_type.clone(),
            textual_name: parsed.instance_name.clone(),
            textual_type: parsed.cell_type.clone(),
        },
    }
}

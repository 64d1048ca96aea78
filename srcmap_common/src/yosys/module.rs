use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SrcMapError, read_to_string};

/// Attribute key under which Yosys records the originating source range.
pub const SRC_ATTRIBUTE: &str = "src";

/// Top-level `write_json` document. Module order follows the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YosysDesign {
    /// Modules by name.
    #[serde(default)]
    pub modules: IndexMap<String, YosysModule>,
}

/// One module of a `write_json` document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YosysModule {
    /// Module attributes such as `top`, `blackbox` and `src`.
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    /// Cell instances in document order.
    #[serde(default)]
    pub cells: CellList,
}

/// One cell instance. Ports, parameters and connections are not modeled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YosysCell {
    /// Library cell or internal Yosys cell type.
    #[serde(rename = "type", default)]
    pub cell_type: String,
    /// Cell attributes, including `src` when Yosys recorded one.
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
}

/// Cells of one module in document order.
///
/// A list, not a map: repeated names must survive parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellList(pub Vec<(String, YosysCell)>);

impl YosysDesign {
    /// Loads a design from a `write_json` file.
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SrcMapError::json(path, e))
    }

    /// Modules that contain at least one cell.
    ///
    /// Cell-less modules are interface or black-box declarations.
    pub fn design_units(&self) -> impl Iterator<Item = (&str, &YosysModule)> {
        self.modules
            .iter()
            .filter(|(_, module)| !module.cells.is_empty())
            .map(|(name, module)| (name.as_str(), module))
    }
}

impl YosysCell {
    /// The `src` attribute, when present as a non-empty string.
    ///
    /// Yosys encodes integer attributes as bit strings or numbers; those never
    /// name a source location and are ignored.
    pub fn source_span(&self) -> Option<&str> {
        self.attributes
            .get(SRC_ATTRIBUTE)
            .and_then(Value::as_str)
            .filter(|src| !src.is_empty())
    }
}

impl CellList {
    /// Number of cells, repeats included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the module has no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(name, cell)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &YosysCell)> {
        self.0.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

impl<'de> Deserialize<'de> for CellList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CellListVisitor;

        impl<'de> Visitor<'de> for CellListVisitor {
            type Value = CellList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of cell names to cells")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<CellList, A::Error> {
                let mut cells = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, cell)) = map.next_entry::<String, YosysCell>()? {
                    cells.push((name, cell));
                }
                Ok(CellList(cells))
            }
        }

        deserializer.deserialize_map(CellListVisitor)
    }
}

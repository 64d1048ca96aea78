#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::{Map, Value, json};

pub fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A synthesized cell as the fixtures describe it.
#[derive(Debug, Clone)]
pub struct SynthCell {
    pub structured_name: String,
    pub textual_name: String,
    pub cell_type: String,
    pub src: Option<String>,
}

/// `count` cells with Yosys-internal JSON names and stable textual names.
/// Every cell except those whose index is in `unannotated` carries a span.
pub fn synth_cells(count: usize, unannotated: &[usize]) -> Vec<SynthCell> {
    const TYPES: [&str; 3] = [
        "sky130_fd_sc_hd__and2_1",
        "sky130_fd_sc_hd__dfxtp_1",
        "sky130_fd_sc_hd__xor2_1",
    ];

    (0..count)
        .map(|i| SynthCell {
            structured_name: format!("$abc${}$auto$blifparse.cc:396:parse_blif${}", 100 + i, 200 + i),
            textual_name: format!("_{}_", 100 + i),
            cell_type: TYPES[i % TYPES.len()].to_string(),
            src: (!unannotated.contains(&i)).then(|| format!("counter.v:{}.5-{}.20", i + 1, i + 1)),
        })
        .collect()
}

/// Yosys `write_json` text for a single `top` module plus one black box.
pub fn yosys_json(cells: &[SynthCell]) -> String {
    let mut cell_map = Map::new();
    for cell in cells {
        let mut attributes = Map::new();
        if let Some(src) = &cell.src {
            attributes.insert("src".into(), Value::String(src.clone()));
        }
        cell_map.insert(
            cell.structured_name.clone(),
            json!({
                "hide_name": 1,
                "type": cell.cell_type,
                "parameters": {},
                "attributes": attributes,
                "connections": { "A": [2], "X": [3] }
            }),
        );
    }

    let doc = json!({
        "creator": "Yosys 0.38",
        "modules": {
            "sky130_fd_sc_hd__and2_1": {
                "attributes": { "blackbox": "00000000000000000000000000000001" },
                "ports": {},
                "cells": {}
            },
            "top": {
                "attributes": { "top": "00000000000000000000000000000001", "src": "counter.v:1.1-30.10" },
                "ports": {},
                "cells": cell_map
            }
        }
    });
    serde_json::to_string_pretty(&doc).unwrap()
}

/// Verilog text instantiating `(instance, type)` pairs inside `top`.
pub fn verilog_netlist(cells: &[(String, String)]) -> String {
    let mut text = String::from(
        "// Generated by a netlist writer\n\
         module top (clk,\n    rst);\n input clk;\n input rst;\n wire n1;\n wire n2;\n\n",
    );
    for (instance, cell_type) in cells {
        text.push_str(&format!(
            " {cell_type} {instance} (.A(n1),\n    .X(n2));\n"
        ));
    }
    text.push_str("endmodule\n");
    text
}

/// Textual sibling for `cells`, using their stable names.
pub fn sibling_netlist(cells: &[SynthCell]) -> String {
    verilog_netlist(
        &cells
            .iter()
            .map(|c| (c.textual_name.clone(), c.cell_type.clone()))
            .collect::<Vec<_>>(),
    )
}

pub fn write(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    path.to_path_buf()
}

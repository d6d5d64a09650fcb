#[cfg(not(target_arch = "wasm32"))]
use pyo3::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod ast;
pub mod classifier;
pub mod comment;
pub mod config;
pub mod error;
pub mod index;
pub mod outline;
pub mod parser;
pub mod reparse;
pub mod tree;
pub mod types;

pub use ast::{MethodParameter, Node, NodeFields, NodeId, NodeType, VarAssignment, Visibility};
pub use classifier::{classify, classify_with, ClassifiedLine};
pub use comment::split_comment;
pub use config::{IndexOptions, ParseOptions};
pub use error::{Error, Result};
pub use index::{Symbol, SymbolIndex};
pub use outline::{filter_outline, outline, OutlineItem};
pub use parser::parse;
pub use reparse::{Reparser, Snapshot};
pub use tree::SkriptTree;

/// Parses `text` and renders every node as pretty JSON.
pub fn parse_to_json(text: &str, options: &ParseOptions) -> Result<String> {
    let tree = parser::parse(text, options);
    let output = types::ParsedFile::from_tree(&tree);
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Parses `text` and renders its structural outline as pretty JSON.
pub fn outline_to_json(text: &str, options: &ParseOptions) -> Result<String> {
    let tree = parser::parse(text, options);
    Ok(serde_json::to_string_pretty(&outline::outline(&tree))?)
}

#[cfg(not(target_arch = "wasm32"))]
fn options_from_json(options_json: Option<&str>) -> PyResult<ParseOptions> {
    match options_json {
        Some(text) => ParseOptions::from_json(text)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())),
        None => Ok(ParseOptions::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[pyfunction]
#[pyo3(signature = (text, options_json=None))]
fn parse_text(text: String, options_json: Option<String>) -> PyResult<String> {
    let options = options_from_json(options_json.as_deref())?;
    parse_to_json(&text, &options)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
#[pyfunction]
#[pyo3(signature = (text, options_json=None))]
fn outline_text(text: String, options_json: Option<String>) -> PyResult<String> {
    let options = options_from_json(options_json.as_deref())?;
    outline_to_json(&text, &options)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn parse_text_wasm(text: &str) -> std::result::Result<String, JsValue> {
    parse_to_json(text, &ParseOptions::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn parse_text_with_options_wasm(
    text: &str,
    tab_width: usize,
    classify_options: bool,
) -> std::result::Result<String, JsValue> {
    let options = ParseOptions {
        tab_width,
        classify_options,
    };
    parse_to_json(text, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn outline_text_wasm(text: &str) -> std::result::Result<String, JsValue> {
    outline_to_json(text, &ParseOptions::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
#[pymodule]
fn skript_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_text, m)?)?;
    m.add_function(wrap_pyfunction!(outline_text, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_json(text: &str) -> serde_json::Value {
        let out = parse_to_json(text, &ParseOptions::default()).unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn function_fields_in_json() {
        let v = parse_json("function heal(p: player, amount: number = \"10\")::void\n");
        assert_eq!(
            v["nodes"][0],
            json!({
                "line_no": 1,
                "depth": 0,
                "node_type": "FUNCTION",
                "content": "function heal(p: player, amount: number = \"10\")::void",
                "name": "heal",
                "params": [
                    { "name": "p", "type": "player", "defaultValue": "" },
                    { "name": "amount", "type": "number", "defaultValue": "10" }
                ],
                "return": "void",
                "ready": true
            })
        );
    }

    #[test]
    fn variable_fields_in_json() {
        let v = parse_json("on load:\n    set {@list::a::b} to 3 # seed\n    set {\n");
        assert_eq!(
            v["nodes"][1],
            json!({
                "line_no": 2,
                "depth": 4,
                "parent": 0,
                "node_type": "SET_VAR",
                "content": "set {@list::a::b} to 3 # seed",
                "comment": "# seed",
                "name": "list",
                "visibility": "global",
                "from_option": true,
                "set_value": "3 # seed",
                "path": ["a", "b"]
            })
        );
        assert_eq!(
            v["nodes"][2],
            json!({
                "line_no": 3,
                "depth": 4,
                "parent": 0,
                "node_type": "SET_VAR",
                "content": "set {",
                "name": "",
                "visibility": "global",
                "invalid": true
            })
        );
    }

    #[test]
    fn function_without_parens_has_no_ready() {
        let v = parse_json("function broken:\n");
        let node = v["nodes"][0].as_object().unwrap();
        assert_eq!(node["node_type"], "FUNCTION");
        assert!(!node.contains_key("ready"));
        assert!(!node.contains_key("params"));
        assert!(!node.contains_key("return"));
    }

    #[test]
    fn outline_json() {
        let out = outline_to_json("command /spawn:\n    trigger:\n", &ParseOptions::default()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["label"], "spawn");
        assert_eq!(v[0]["children"][0]["nodeType"], "TRIGGER");
    }

    #[test]
    fn node_output_round_trips_type() {
        let tree = parse("loop 3 times:\n", &ParseOptions::default());
        let file = types::ParsedFile::from_tree(&tree);
        assert_eq!(file.nodes[0].node_type(), Some(NodeType::Loop));
    }
}

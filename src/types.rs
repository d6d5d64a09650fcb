use crate::ast::{MethodParameter, Node, NodeFields, NodeType, VarAssignment, Visibility};
use crate::tree::SkriptTree;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParsedFile {
    pub nodes: Vec<NodeOutput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NodeOutput {
    pub line_no: usize,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>, // index into `nodes`
    pub node_type: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<MethodParameter>>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_option: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<bool>,
}

impl NodeOutput {
    pub fn from_node(node: &Node) -> Self {
        let mut out = NodeOutput {
            line_no: node.line_no(),
            depth: node.depth(),
            parent: node.parent().map(|p| p.0),
            node_type: node.node_type().as_str().to_string(),
            content: node.content().to_string(),
            comment: node.has_comment().then(|| node.comment_part().to_string()),
            name: node.name().map(str::to_string),
            ..NodeOutput::default()
        };

        match node.fields() {
            NodeFields::Function(Some(sig)) => {
                out.params = Some(sig.params.clone());
                out.return_type = Some(sig.return_type.clone());
                out.ready = Some(true);
            }
            NodeFields::SetVar(VarAssignment::Valid {
                visibility,
                from_option,
                set_value,
                path,
                ..
            }) => {
                out.visibility = Some(*visibility);
                out.from_option = from_option.then_some(true);
                out.set_value = Some(set_value.clone());
                out.path = path.clone();
            }
            NodeFields::SetVar(VarAssignment::Invalid) => {
                out.visibility = Some(Visibility::Global);
                out.invalid = Some(true);
            }
            _ => {}
        }
        out
    }

    pub fn node_type(&self) -> Option<NodeType> {
        serde_json::from_value(serde_json::Value::String(self.node_type.clone())).ok()
    }
}

impl ParsedFile {
    pub fn from_tree(tree: &SkriptTree) -> Self {
        ParsedFile {
            nodes: tree.iter().map(|(_, n)| NodeOutput::from_node(n)).collect(),
        }
    }
}

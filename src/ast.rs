use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Undefined,
    Option,
    Options,
    FunctionCall,
    Function,
    Command,
    Comment,
    Event,
    IfStatement,
    ElseStatement,
    Loop,
    Trigger,
    Class,
    Stop,
    SetVar,
    Statement,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Undefined => "UNDEFINED",
            NodeType::Option => "OPTION",
            NodeType::Options => "OPTIONS",
            NodeType::FunctionCall => "FUNCTION_CALL",
            NodeType::Function => "FUNCTION",
            NodeType::Command => "COMMAND",
            NodeType::Comment => "COMMENT",
            NodeType::Event => "EVENT",
            NodeType::IfStatement => "IF_STATEMENT",
            NodeType::ElseStatement => "ELSE_STATEMENT",
            NodeType::Loop => "LOOP",
            NodeType::Trigger => "TRIGGER",
            NodeType::Class => "CLASS",
            NodeType::Stop => "STOP",
            NodeType::SetVar => "SET_VAR",
            NodeType::Statement => "STATEMENT",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Empty when the parameter has no default.
    #[serde(rename = "defaultValue")]
    pub default_value: String,
}

impl MethodParameter {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            default_value: default_value.into(),
        }
    }

    pub fn has_default(&self) -> bool {
        !self.default_value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<MethodParameter>,
    pub return_type: String, // "void" when no `::` clause
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Local,  // {_name}
    Global, // {name} or {@name}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarAssignment {
    Valid {
        name: String, // sigil stripped
        visibility: Visibility,
        from_option: bool,
        set_value: String,
        path: Option<Vec<String>>,
    },
    /// The line starts like an assignment but could not be taken apart.
    Invalid,
}

/// Fields extracted from a line, determined by its [`NodeType`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeFields {
    #[default]
    None,
    FunctionCall {
        name: String,
    },
    /// `None` when the signature had no parentheses; consumers must not
    /// trust anything about such a function beyond its type.
    Function(Option<FunctionSignature>),
    Command {
        name: String,
    },
    Event {
        name: String,
    },
    Class {
        name: String,
    },
    SetVar(VarAssignment),
}

impl NodeFields {
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeFields::None | NodeFields::Function(None) => None,
            NodeFields::FunctionCall { name }
            | NodeFields::Command { name }
            | NodeFields::Event { name }
            | NodeFields::Class { name } => Some(name.as_str()),
            NodeFields::Function(Some(sig)) => Some(sig.name.as_str()),
            NodeFields::SetVar(VarAssignment::Valid { name, .. }) => Some(name.as_str()),
            NodeFields::SetVar(VarAssignment::Invalid) => Some(""),
        }
    }

    pub fn signature(&self) -> Option<&FunctionSignature> {
        match self {
            NodeFields::Function(sig) => sig.as_ref(),
            _ => None,
        }
    }

    pub fn assignment(&self) -> Option<&VarAssignment> {
        match self {
            NodeFields::SetVar(var) => Some(var),
            _ => None,
        }
    }

    /// Whether a function signature parsed cleanly.
    pub fn is_ready(&self) -> bool {
        self.signature().is_some()
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, NodeFields::SetVar(VarAssignment::Invalid))
    }
}

/// One line of Skript source, classified and placed in a [`crate::tree::SkriptTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) raw: String,
    pub(crate) content: String,
    pub(crate) line_no: usize,
    pub(crate) depth: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
    pub(crate) fields: NodeFields,
    pub(crate) comment: Option<String>,
}

impl Node {
    /// The line exactly as it appeared in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `raw` without `\r` and tabs, trimmed. Everything is classified from this.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn fields(&self) -> &NodeFields {
        &self.fields
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.name()
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    /// Trailing comment including its `#`, if any.
    pub fn comment_part(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_empty()
    }
}

/// Strips carriage returns and tabs, then trims.
pub fn normalize_content(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\r' && *c != '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tabs_and_carriage_returns() {
        assert_eq!(normalize_content("\t\ton join:\r"), "on join:");
        assert_eq!(normalize_content("  send\t\"hi\"  "), "send\"hi\"");
        assert_eq!(normalize_content(" \t \r"), "");
    }

    #[test]
    fn invalid_assignment_reports_empty_name() {
        let fields = NodeFields::SetVar(VarAssignment::Invalid);
        assert_eq!(fields.name(), Some(""));
        assert!(fields.is_invalid());
        assert!(!fields.is_ready());
    }

    #[test]
    fn unparsed_function_has_no_name() {
        let fields = NodeFields::Function(None);
        assert_eq!(fields.name(), None);
        assert!(!fields.is_ready());
    }

    #[test]
    fn node_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&NodeType::FunctionCall).unwrap();
        assert_eq!(json, "\"FUNCTION_CALL\"");
        assert_eq!(NodeType::SetVar.to_string(), "SET_VAR");
    }
}

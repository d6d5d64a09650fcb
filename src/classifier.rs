use crate::ast::{
    normalize_content, FunctionSignature, MethodParameter, Node, NodeFields, NodeType,
    VarAssignment, Visibility,
};
use crate::comment::split_comment;
use crate::config::ParseOptions;

/// A single line after classification, not yet placed in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub content: String,
    pub node_type: NodeType,
    pub fields: NodeFields,
    pub comment: Option<String>,
}

impl ClassifiedLine {
    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }
}

/// Classifies one raw line given its parent node, using default options.
pub fn classify(raw: &str, parent: Option<&Node>) -> ClassifiedLine {
    classify_with(
        raw,
        parent.map(Node::node_type),
        &ParseOptions::default(),
    )
}

/// Classifies one raw line given the type of its parent.
///
/// The rules run in a fixed order over the lower-cased content and a later
/// match replaces an earlier one, so the order below is load-bearing.
pub fn classify_with(
    raw: &str,
    parent_type: Option<NodeType>,
    options: &ParseOptions,
) -> ClassifiedLine {
    let content = normalize_content(raw);
    let (node_type, fields) = classify_content(&content, parent_type, options);
    let comment = if node_type == NodeType::Comment {
        None
    } else {
        split_comment(&content).map(str::to_string)
    };

    ClassifiedLine {
        content,
        node_type,
        fields,
        comment,
    }
}

fn classify_content(
    content: &str,
    parent_type: Option<NodeType>,
    options: &ParseOptions,
) -> (NodeType, NodeFields) {
    let lower = content.to_lowercase();
    let mut node_type = NodeType::Undefined;
    let mut fields = NodeFields::None;

    if parent_type == Some(NodeType::Options) {
        // Option entries stay unassigned unless explicitly enabled.
        if options.classify_options {
            return (NodeType::Option, NodeFields::None);
        }
    } else if lower.starts_with("options:") {
        node_type = NodeType::Options;
    }

    if is_function_call(content) {
        node_type = NodeType::FunctionCall;
        fields = NodeFields::FunctionCall {
            name: content.split('(').next().unwrap_or("").to_string(),
        };
    }
    if lower.starts_with("function ") {
        node_type = NodeType::Function;
        fields = NodeFields::Function(parse_signature(content));
    }
    if lower.starts_with("command ") {
        node_type = NodeType::Command;
        fields = NodeFields::Command {
            name: second_token(content).replace(|c: char| c == '/' || c == ':', ""),
        };
    }
    if lower.starts_with('#') {
        node_type = NodeType::Comment;
        fields = NodeFields::None;
    }
    if lower.starts_with("on ") {
        node_type = NodeType::Event;
        fields = NodeFields::Event {
            name: content.replace(':', "").replace("on ", ""),
        };
    }
    if lower.starts_with("if ") {
        node_type = NodeType::IfStatement;
        fields = NodeFields::None;
    }
    if lower.starts_with("else ") || lower.starts_with("else if") {
        node_type = NodeType::ElseStatement;
        fields = NodeFields::None;
    }
    if lower.starts_with("loop ") || lower.starts_with("while ") {
        node_type = NodeType::Loop;
        fields = NodeFields::None;
    }
    if lower.starts_with("trigger:") {
        node_type = NodeType::Trigger;
        fields = NodeFields::None;
    }
    if lower.starts_with("class ") {
        let token = second_token(content);
        node_type = NodeType::Class;
        fields = NodeFields::Class {
            name: token.strip_suffix(':').unwrap_or(token).to_string(),
        };
    }
    if lower.starts_with("stop ") {
        node_type = NodeType::Stop;
        fields = NodeFields::None;
    }
    if lower.starts_with("set {") {
        node_type = NodeType::SetVar;
        fields = NodeFields::SetVar(parse_assignment(content));
    }

    if node_type == NodeType::Undefined && !content.is_empty() {
        node_type = NodeType::Statement;
    }

    (node_type, fields)
}

/// Second token when splitting on single spaces; empty if there is none.
fn second_token(content: &str) -> &str {
    content.split(' ').nth(1).unwrap_or("")
}

/// Whitespace as understood by `\s` in the classic line patterns.
fn is_pattern_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Whole-line `callee(...)` shape: a non-empty run without whitespace, an
/// opening paren, anything on the same line, and a closing paren at the end.
fn is_function_call(content: &str) -> bool {
    let Some(close) = content.len().checked_sub(1) else {
        return false;
    };
    if !content.ends_with(')') {
        return false;
    }
    for (idx, ch) in content.char_indices() {
        if is_pattern_space(ch) {
            return false;
        }
        if ch == '(' && idx > 0 && idx < close {
            let args = &content[idx + 1..close];
            if !args.chars().any(is_line_terminator) {
                return true;
            }
        }
    }
    false
}

/// Parses `function name(a: type, b: type = "default") :: return`.
///
/// Returns `None` when the line has no parentheses at all.
pub fn parse_signature(content: &str) -> Option<FunctionSignature> {
    if !content.contains('(') || !content.contains(')') {
        return None;
    }
    let (head, after_open) = content.split_once('(')?;
    let name = head.split_once(' ').map(|(_, n)| n).unwrap_or("").trim();
    let list = after_open.split(')').next().unwrap_or("");
    let params = list.split(',').filter_map(parse_parameter).collect();
    let return_type = match content.split_once("::") {
        Some((_, rest)) => rest.replace(':', "").trim().to_string(),
        None => "void".to_string(),
    };

    Some(FunctionSignature {
        name: name.to_string(),
        params,
        return_type,
    })
}

/// `name: type` or `name: type = default`; segments without `:` or without a
/// name are skipped.
fn parse_parameter(segment: &str) -> Option<MethodParameter> {
    let (name, rest) = segment.trim().split_once(':')?;
    if name.trim().is_empty() {
        return None;
    }
    let (type_name, default_value) = match rest.split_once('=') {
        Some((ty, value)) => (ty.trim(), value.replace('"', "").trim().to_string()),
        None => (rest.trim(), String::new()),
    };
    Some(MethodParameter::new(name.trim(), type_name, default_value))
}

/// Parses `set {var} to value`, falling back to [`VarAssignment::Invalid`]
/// when the line cannot be taken apart.
pub fn parse_assignment(content: &str) -> VarAssignment {
    take_assignment(content).unwrap_or(VarAssignment::Invalid)
}

fn take_assignment(content: &str) -> Option<VarAssignment> {
    let target = content.get(3..)?.trim_start();
    // `{{...}` addresses an element inside a list or map variable.
    let brace_depth = if target.starts_with("{{") { 2 } else { 1 };
    let opened = content.split('{').nth(brace_depth)?;
    let (inner, after) = opened.split_once('}')?;

    let (base, mut segments) = match inner.split_once("::") {
        Some((base, rest)) => (base, split_path(rest)),
        None => (inner, Vec::new()),
    };
    let mut after = after;
    if brace_depth == 2 {
        // `{{_map}::a::b}`: the element path follows the inner pair.
        let rest = after.strip_prefix("::").unwrap_or(after);
        let (element, tail) = rest.split_once('}').unwrap_or((rest, ""));
        segments = split_path(element);
        after = tail;
    }

    let (name, visibility, from_option) = if let Some(name) = base.strip_prefix('_') {
        (name, Visibility::Local, false)
    } else if let Some(name) = base.strip_prefix('@') {
        (name, Visibility::Global, true)
    } else {
        (base, Visibility::Global, false)
    };

    let (_, value) = after.split_once("to")?;
    let path = content.contains("::").then_some(segments);

    Some(VarAssignment::Valid {
        name: name.to_string(),
        visibility,
        from_option,
        set_value: value.trim().to_string(),
        path,
    })
}

fn split_path(text: &str) -> Vec<String> {
    text.split("::").map(str::to_string).collect()
}

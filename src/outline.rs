use crate::ast::{Node, NodeFields, NodeId, NodeType, VarAssignment};
use crate::comment::strip_comment;
use crate::tree::SkriptTree;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    pub label: String,
    pub node_type: NodeType,
    pub line: usize,
    pub children: Vec<OutlineItem>,
}

/// Projects a parsed script onto its structural outline.
///
/// Lines that carry no structure are skipped but their descendants are
/// still attached to the nearest structural ancestor.
pub fn outline(tree: &SkriptTree) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    for root in tree.roots() {
        project(tree, *root, None, &mut items);
    }
    items
}

fn project(tree: &SkriptTree, id: NodeId, parent: Option<NodeType>, out: &mut Vec<OutlineItem>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    if !is_structural(node, parent) {
        for (child, _) in tree.children(id) {
            project(tree, child, Some(node.node_type()), out);
        }
        return;
    }

    let mut item = OutlineItem {
        label: label(node),
        node_type: node.node_type(),
        line: node.line_no(),
        children: Vec::new(),
    };
    for (child, _) in tree.children(id) {
        project(tree, child, Some(node.node_type()), &mut item.children);
    }
    out.push(item);
}

fn is_structural(node: &Node, parent: Option<NodeType>) -> bool {
    match node.node_type() {
        NodeType::Event
        | NodeType::Function
        | NodeType::Command
        | NodeType::Class
        | NodeType::Options
        | NodeType::Option
        | NodeType::Trigger
        | NodeType::IfStatement
        | NodeType::ElseStatement
        | NodeType::Loop
        | NodeType::SetVar => true,
        NodeType::Undefined | NodeType::Comment => false,
        _ => parent == Some(NodeType::Options),
    }
}

fn label(node: &Node) -> String {
    match node.fields() {
        NodeFields::Function(Some(sig)) => {
            let params: Vec<String> = sig
                .params
                .iter()
                .map(|p| {
                    if p.has_default() {
                        format!("{}: {} = {}", p.name, p.type_name, p.default_value)
                    } else {
                        format!("{}: {}", p.name, p.type_name)
                    }
                })
                .collect();
            format!("{}({}) :: {}", sig.name, params.join(", "), sig.return_type)
        }
        NodeFields::SetVar(VarAssignment::Invalid) => plain_label(node),
        fields => match fields.name() {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => plain_label(node),
        },
    }
}

fn plain_label(node: &Node) -> String {
    let code = strip_comment(node.content()).trim_end();
    code.strip_suffix(':').unwrap_or(code).trim_end().to_string()
}

fn filter_item(item: &OutlineItem, keyword: &str) -> Option<OutlineItem> {
    let children: Vec<OutlineItem> = item
        .children
        .iter()
        .filter_map(|child| filter_item(child, keyword))
        .collect();

    if !item.label.to_lowercase().contains(keyword) && children.is_empty() {
        return None;
    }

    Some(OutlineItem {
        label: item.label.clone(),
        node_type: item.node_type,
        line: item.line,
        children,
    })
}

/// Keeps items whose label contains `keyword` (case-insensitive) together
/// with their ancestors.
pub fn filter_outline(items: Vec<OutlineItem>, keyword: &str) -> Vec<OutlineItem> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return items;
    }
    items
        .iter()
        .filter_map(|item| filter_item(item, &keyword))
        .collect()
}

pub fn render_outline(items: &[OutlineItem]) -> String {
    let mut out = String::new();
    render_items(items, 0, &mut out);
    out
}

fn render_items(items: &[OutlineItem], level: usize, out: &mut String) {
    for item in items {
        let _ = writeln!(
            out,
            "{}{} {} (line {})",
            "  ".repeat(level),
            item.node_type,
            item.label,
            item.line
        );
        render_items(&item.children, level + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::parser::parse;
    use indoc::indoc;

    const SCRIPT: &str = indoc! {r#"
        # utilities
        options:
            prefix: &a[Server]
            cooldown: 5 seconds
        on join:
            set {_greeting} to "hi" # note
            if player has permission "vip":
                send "{@prefix} welcome" to player
                loop 3 times:
                    play sound "ding"
        function heal(p: player, amount: number = "10") :: number:
            heal {_p} by {_amount}
        command /spawn:
            trigger:
                teleport player to spawn
        set {
    "#};

    #[test]
    fn projects_structure() {
        let items = outline(&parse(SCRIPT, &ParseOptions::default()));
        insta::assert_snapshot!(render_outline(&items), @r#"
        OPTIONS options (line 2)
          STATEMENT prefix: &a[Server] (line 3)
          STATEMENT cooldown: 5 seconds (line 4)
        EVENT join (line 5)
          SET_VAR greeting (line 6)
          IF_STATEMENT if player has permission "vip" (line 7)
            LOOP loop 3 times (line 9)
        FUNCTION heal(p: player, amount: number = 10) :: number (line 11)
        COMMAND spawn (line 13)
          TRIGGER trigger (line 14)
        SET_VAR set { (line 16)
        "#);
    }

    #[test]
    fn filter_keeps_matching_ancestors() {
        let items = outline(&parse(SCRIPT, &ParseOptions::default()));
        let filtered = filter_outline(items, "LOOP");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "join");
        assert_eq!(filtered[0].children.len(), 1);
        assert_eq!(filtered[0].children[0].node_type, NodeType::IfStatement);
        assert_eq!(filtered[0].children[0].children[0].line, 9);
    }

    #[test]
    fn empty_filter_is_identity() {
        let items = outline(&parse(SCRIPT, &ParseOptions::default()));
        assert_eq!(filter_outline(items.clone(), "  "), items);
    }

    #[test]
    fn serializes_camel_case() {
        let items = outline(&parse("on load:\n", &ParseOptions::default()));
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "label": "load", "nodeType": "EVENT", "line": 1, "children": [] }
            ])
        );
    }
}

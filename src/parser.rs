use crate::ast::{Node, NodeId, NodeType};
use crate::classifier::classify_with;
use crate::config::ParseOptions;
use crate::tree::SkriptTree;
use winnow::token::take_while;
use winnow::{ModalResult, Parser};

/// Parses a whole script into a tree of classified nodes.
///
/// Never fails: unknown lines become statements and malformed ones are
/// flagged on the node itself.
pub fn parse(input: &str, options: &ParseOptions) -> SkriptTree {
    let mut tree = SkriptTree::new();
    if input.is_empty() {
        return tree;
    }

    let body = input.strip_suffix('\n').unwrap_or(input);
    // Open blocks, innermost last.
    let mut open: Vec<NodeId> = Vec::new();
    // Blank lines sit beside the previous non-blank line.
    let mut sibling_parent: Option<NodeId> = None;

    for (idx, line) in body.split('\n').enumerate() {
        let line_no = idx + 1;
        let text = if idx == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line
        };

        let mut rest = text;
        let indent = indentation(&mut rest).unwrap_or_default();
        let depth = indent_depth(indent, options.tab_width);
        let blank = rest.trim().is_empty();

        if !blank {
            while let Some(top) = open.last() {
                match tree.get(*top) {
                    Some(node) if node.depth >= depth => {
                        open.pop();
                    }
                    _ => break,
                }
            }
        }

        let parent = if blank {
            sibling_parent
        } else {
            open.last().copied()
        };
        let parent_type = parent.and_then(|p| tree.get(p)).map(Node::node_type);
        let classified = classify_with(text, parent_type, options);

        if classified.node_type == NodeType::SetVar && classified.fields.is_invalid() {
            tracing::debug!(line_no, content = %classified.content, "malformed variable assignment");
        }

        let id = tree.push(Node {
            raw: line.to_string(),
            content: classified.content,
            line_no,
            depth,
            parent,
            children: Vec::new(),
            node_type: classified.node_type,
            fields: classified.fields,
            comment: classified.comment,
        });

        if !blank {
            sibling_parent = parent;
            open.push(id);
        }
    }

    tracing::debug!(nodes = tree.len(), roots = tree.roots().len(), "parsed script");
    tree
}

fn indentation<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(0.., (' ', '\t')).parse_next(input)
}

fn indent_depth(indent: &str, tab_width: usize) -> usize {
    indent.chars().fold(0usize, |depth, c| {
        depth.saturating_add(if c == '\t' { tab_width } else { 1 })
    })
}

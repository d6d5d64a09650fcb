use crate::ast::{Node, NodeId};
use std::fmt::Write;

/// Nodes of one script in source order. Parent and child links are indices
/// into the same arena.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkriptTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SkriptTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        match node.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |c| self.get(*c).map(|n| (*c, n)))
    }

    /// Parent first, walking up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let mut next = self.get(id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let id = next?;
            let node = self.get(id)?;
            next = node.parent;
            Some((id, node))
        })
    }

    /// Every node in source order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Every non-blank node in source order.
    pub fn flat_list(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| !n.is_blank()).collect()
    }

    pub fn node_at_line(&self, line_no: usize) -> Option<(NodeId, &Node)> {
        let idx = line_no.checked_sub(1)?;
        self.nodes
            .get(idx)
            .filter(|n| n.line_no == line_no)
            .map(|n| (NodeId(idx), n))
            .or_else(|| self.iter().find(|(_, n)| n.line_no == line_no))
    }

    /// Indented `TYPE@line content` listing, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.dump_node(*root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, level: usize, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        let _ = write!(out, "{}{}@{}", "  ".repeat(level), node.node_type, node.line_no);
        if !node.content.is_empty() {
            let _ = write!(out, " {}", node.content);
        }
        out.push('\n');
        for child in &node.children {
            self.dump_node(*child, level + 1, out);
        }
    }
}

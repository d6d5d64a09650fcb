//! Cross-file symbol index used for completion.
//!
//! Each script contributes the functions, commands, events, global variables
//! and option keys it declares. Files are indexed independently so a single
//! file can be swapped out after a reparse without touching the rest.

use crate::ast::{MethodParameter, NodeFields, NodeType, VarAssignment, Visibility};
use crate::comment::strip_comment;
use crate::config::{IndexOptions, ParseOptions};
use crate::error::{Error, Result};
use crate::parser::parse;
use crate::tree::SkriptTree;
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Symbol {
    Function {
        name: String,
        params: Vec<MethodParameter>,
        #[serde(rename = "return")]
        return_type: String,
        line: usize,
    },
    Command {
        name: String,
        line: usize,
    },
    Event {
        name: String,
        line: usize,
    },
    Variable {
        name: String,
        visibility: Visibility,
        from_option: bool,
        line: usize,
    },
    #[serde(rename = "option")]
    OptionKey {
        name: String,
        line: usize,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Function { name, .. }
            | Symbol::Command { name, .. }
            | Symbol::Event { name, .. }
            | Symbol::Variable { name, .. }
            | Symbol::OptionKey { name, .. } => name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Symbol::Function { line, .. }
            | Symbol::Command { line, .. }
            | Symbol::Event { line, .. }
            | Symbol::Variable { line, .. }
            | Symbol::OptionKey { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Function { .. } => "function",
            Symbol::Command { .. } => "command",
            Symbol::Event { .. } => "event",
            Symbol::Variable { .. } => "variable",
            Symbol::OptionKey { .. } => "option",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMatch<'a> {
    pub file: &'a Path,
    pub symbol: &'a Symbol,
}

/// Symbols a single script declares, in source order.
pub fn collect_symbols(tree: &SkriptTree) -> Vec<Symbol> {
    let mut out = Vec::new();
    for (id, node) in tree.iter() {
        let line = node.line_no();
        match node.fields() {
            NodeFields::Function(Some(sig)) => out.push(Symbol::Function {
                name: sig.name.clone(),
                params: sig.params.clone(),
                return_type: sig.return_type.clone(),
                line,
            }),
            NodeFields::Command { name } => out.push(Symbol::Command {
                name: name.clone(),
                line,
            }),
            NodeFields::Event { name } => out.push(Symbol::Event {
                name: name.clone(),
                line,
            }),
            NodeFields::SetVar(VarAssignment::Valid {
                name,
                visibility: Visibility::Global,
                from_option,
                ..
            }) if !name.is_empty() => out.push(Symbol::Variable {
                name: name.clone(),
                visibility: Visibility::Global,
                from_option: *from_option,
                line,
            }),
            _ => {
                let under_options = tree
                    .parent(id)
                    .is_some_and(|p| p.node_type() == NodeType::Options);
                if under_options && !node.is_blank() && node.node_type() != NodeType::Comment {
                    if let Some((key, _)) = strip_comment(node.content()).split_once(':') {
                        let key = key.trim();
                        if !key.is_empty() {
                            out.push(Symbol::OptionKey {
                                name: key.to_string(),
                                line,
                            });
                        }
                    }
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolIndex {
    files: BTreeMap<PathBuf, Vec<Symbol>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and indexes every file in parallel.
    pub fn build(files: &[(PathBuf, String)], options: &ParseOptions) -> Self {
        let files = files
            .par_iter()
            .map(|(path, text)| (path.clone(), collect_symbols(&parse(text, options))))
            .collect();
        Self { files }
    }

    /// Indexes every script under `dir`, honouring ignore files.
    pub fn from_dir(dir: &Path, options: &IndexOptions) -> Result<Self> {
        let walker = WalkBuilder::new(dir).standard_filters(true).build();
        let mut sources = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !options.matches_extension(path) {
                continue;
            }
            let text = fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            sources.push((path.to_path_buf(), text));
        }
        tracing::debug!(dir = %dir.display(), files = sources.len(), "indexing scripts");
        Ok(Self::build(&sources, &options.parse))
    }

    pub fn update_tree(&mut self, path: impl Into<PathBuf>, tree: &SkriptTree) {
        self.files.insert(path.into(), collect_symbols(tree));
    }

    pub fn update_file(&mut self, path: impl Into<PathBuf>, text: &str, options: &ParseOptions) {
        self.update_tree(path, &parse(text, options));
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn symbols(&self, path: &Path) -> &[Symbol] {
        self.files.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbols whose name starts with `prefix`, ignoring case.
    ///
    /// Sorted by name then file; a name declared in several files is only
    /// reported once per kind.
    pub fn complete(&self, prefix: &str) -> Vec<SymbolMatch<'_>> {
        let prefix = prefix.to_lowercase();
        let mut matches: Vec<SymbolMatch<'_>> = self
            .files
            .iter()
            .flat_map(|(file, symbols)| {
                symbols.iter().map(move |symbol| SymbolMatch {
                    file: file.as_path(),
                    symbol,
                })
            })
            .filter(|m| m.symbol.name().to_lowercase().starts_with(&prefix))
            .collect();

        matches.sort_by(|a, b| {
            a.symbol
                .name()
                .cmp(b.symbol.name())
                .then_with(|| a.file.cmp(b.file))
                .then_with(|| a.symbol.line().cmp(&b.symbol.line()))
        });

        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert((m.symbol.kind(), m.symbol.name().to_string())));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const MAIN: &str = indoc! {r#"
        options:
            prefix: &a[Server]
            # not an option
        function heal(p: player, amount: number = "10") :: number:
            set {_local} to 1
            set {heals::%p%} to 2
        function broken:
        command /home:
            trigger:
                set {@home} to location of player
        on join:
            set {greeting} to "hi"
        set {
    "#};

    const OTHER: &str = indoc! {r#"
        function helper() :: text:
            return "x"
        on join:
            set {greeting} to "hello"
    "#};

    fn index() -> SymbolIndex {
        SymbolIndex::build(
            &[
                (PathBuf::from("main.sk"), MAIN.to_string()),
                (PathBuf::from("other.sk"), OTHER.to_string()),
            ],
            &ParseOptions::default(),
        )
    }

    #[test]
    fn collects_declarations() {
        let tree = parse(MAIN, &ParseOptions::default());
        let names: Vec<String> = collect_symbols(&tree)
            .iter()
            .map(|s| format!("{} {}", s.kind(), s.name()))
            .collect();
        assert_eq!(
            names,
            [
                "option prefix",
                "function heal",
                "variable heals",
                "command home",
                "variable home",
                "event join",
                "variable greeting",
            ]
        );
    }

    #[test]
    fn option_sourced_variable_is_flagged() {
        let tree = parse(MAIN, &ParseOptions::default());
        let home = collect_symbols(&tree)
            .into_iter()
            .find(|s| matches!(s, Symbol::Variable { name, .. } if name == "home"))
            .unwrap();
        assert_eq!(
            home,
            Symbol::Variable {
                name: "home".into(),
                visibility: Visibility::Global,
                from_option: true,
                line: 10,
            }
        );
    }

    #[test]
    fn completes_across_files() {
        let index = index();
        let found: Vec<(&str, &str)> = index
            .complete("HE")
            .iter()
            .map(|m| (m.symbol.name(), m.file.to_str().unwrap()))
            .collect();
        assert_eq!(
            found,
            [("heal", "main.sk"), ("heals", "main.sk"), ("helper", "other.sk")]
        );
    }

    #[test]
    fn duplicate_names_reported_once_per_kind() {
        let index = index();
        let joins: Vec<_> = index.complete("join");
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].file, Path::new("main.sk"));
        assert_eq!(index.complete("greet").len(), 1);
    }

    #[test]
    fn update_and_remove() {
        let mut index = index();
        assert!(index.remove_file(Path::new("other.sk")));
        assert!(index.complete("helper").is_empty());
        assert!(!index.remove_file(Path::new("other.sk")));

        index.update_file("other.sk", "on quit:\n", &ParseOptions::default());
        assert_eq!(index.symbols(Path::new("other.sk")).len(), 1);
        assert_eq!(index.files().count(), 2);
    }

    #[test]
    fn function_symbol_serializes_with_signature() {
        let tree = parse("function f(a: text) :: number:\n", &ParseOptions::default());
        let json = serde_json::to_value(collect_symbols(&tree)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "kind": "function",
                "name": "f",
                "params": [{ "name": "a", "type": "text", "defaultValue": "" }],
                "return": "number",
                "line": 1
            }])
        );
    }

    #[test]
    fn indexes_directory() {
        let dir = std::env::temp_dir().join(format!("skript_rs_index_{}", std::process::id()));
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.sk"), "command /a:\n").unwrap();
        fs::write(dir.join("sub").join("b.sk"), "on load:\n").unwrap();
        fs::write(dir.join("notes.txt"), "on ignored:\n").unwrap();

        let index = SymbolIndex::from_dir(&dir, &IndexOptions::default()).unwrap();
        let mut names: Vec<&str> = index.complete("").iter().map(|m| m.symbol.name()).collect();
        names.sort();
        assert_eq!(names, ["a", "load"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}

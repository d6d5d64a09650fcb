use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Indentation depth contributed by one tab character.
    pub tab_width: usize,
    /// Classify children of an `options:` block as `OPTION`.
    ///
    /// Off by default: the classic classifier computes the option case but
    /// never assigns it, so option entries come out as plain statements.
    pub classify_options: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            classify_options: false,
        }
    }
}

impl ParseOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    pub parse: ParseOptions,
    /// File extension (without the dot) of script files picked up from disk.
    pub extension: String,
    /// Maintain the cross-file symbol index on every reparse.
    pub cross_auto_complete: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            extension: "sk".to_string(),
            cross_auto_complete: true,
        }
    }
}

impl IndexOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub(crate) fn matches_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_fill_missing_keys() {
        let opts = IndexOptions::from_json(r#"{ "parse": { "tab_width": 2 } }"#).unwrap();
        assert_eq!(opts.parse.tab_width, 2);
        assert!(!opts.parse.classify_options);
        assert_eq!(opts.extension, "sk");
        assert!(opts.cross_auto_complete);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ParseOptions::from_json("{ tab_width: }").is_err());
    }

    #[test]
    fn extension_match_ignores_case() {
        let opts = IndexOptions::default();
        assert!(opts.matches_extension(Path::new("scripts/Main.SK")));
        assert!(!opts.matches_extension(Path::new("scripts/readme.md")));
        assert!(!opts.matches_extension(Path::new("scripts/sk")));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Comment syntax family a file is assumed to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `//` line comments and `/* */` block comments.
    CStyle,
    /// `#` line comments. PowerShell additionally has `<# #>` blocks.
    HashStyle { supports_block: bool },
    /// `;` line comments only.
    SemicolonStyle,
}

impl Grammar {
    pub fn tag(self) -> GrammarTag {
        match self {
            Grammar::CStyle => GrammarTag::CStyle,
            Grammar::HashStyle {
                supports_block: false,
            } => GrammarTag::HashStylePlain,
            Grammar::HashStyle {
                supports_block: true,
            } => GrammarTag::HashStylePowerShell,
            Grammar::SemicolonStyle => GrammarTag::SemicolonStyle,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tag(), f)
    }
}

/// Grammar name as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarTag {
    CStyle,
    HashStylePlain,
    HashStylePowerShell,
    SemicolonStyle,
}

impl From<GrammarTag> for Grammar {
    fn from(tag: GrammarTag) -> Self {
        match tag {
            GrammarTag::CStyle => Grammar::CStyle,
            GrammarTag::HashStylePlain => Grammar::HashStyle {
                supports_block: false,
            },
            GrammarTag::HashStylePowerShell => Grammar::HashStyle {
                supports_block: true,
            },
            GrammarTag::SemicolonStyle => Grammar::SemicolonStyle,
        }
    }
}

impl fmt::Display for GrammarTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrammarTag::CStyle => "c-style",
            GrammarTag::HashStylePlain => "hash-style-plain",
            GrammarTag::HashStylePowerShell => "hash-style-power-shell",
            GrammarTag::SemicolonStyle => "semicolon-style",
        };
        f.write_str(name)
    }
}

const C_STYLE_EXTS: &[&str] = &[
    "c", "cpp", "cc", "cxx", "h", "hpp", "hh", "rc", "qrc", "mm",
];
const HASH_STYLE_EXTS: &[&str] = &["sh", "bash", "zsh", "fish", "cmake"];
const POWERSHELL_EXTS: &[&str] = &["ps1"];
const SEMI_STYLE_EXTS: &[&str] = &["ahk"];
const HASH_STYLE_FILE_NAMES: &[&str] = &["CMakeLists.txt"];

/// Immutable extension/file-name to grammar mapping.
///
/// Built once at startup and shared read-only between worker threads.
#[derive(Debug, Clone)]
pub struct GrammarTable {
    by_extension: HashMap<String, Grammar>,
    by_file_name: HashMap<String, Grammar>,
}

impl Default for GrammarTable {
    fn default() -> Self {
        let mut by_extension = HashMap::new();
        let groups = [
            (C_STYLE_EXTS, GrammarTag::CStyle),
            (HASH_STYLE_EXTS, GrammarTag::HashStylePlain),
            (POWERSHELL_EXTS, GrammarTag::HashStylePowerShell),
            (SEMI_STYLE_EXTS, GrammarTag::SemicolonStyle),
        ];
        for (exts, tag) in groups {
            for ext in exts {
                by_extension.insert(ext.to_string(), Grammar::from(tag));
            }
        }

        let by_file_name = HASH_STYLE_FILE_NAMES
            .iter()
            .map(|name| (name.to_string(), Grammar::from(GrammarTag::HashStylePlain)))
            .collect();

        Self {
            by_extension,
            by_file_name,
        }
    }
}

impl GrammarTable {
    /// Add or replace extension entries. Keys may be given with or without
    /// the leading dot and in any case.
    pub fn with_overrides(mut self, overrides: &HashMap<String, GrammarTag>) -> Self {
        for (ext, tag) in overrides {
            let key = ext.trim_start_matches('.').to_lowercase();
            self.by_extension.insert(key, Grammar::from(*tag));
        }
        self
    }

    pub fn select(&self, path: &Path) -> Option<Grammar> {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(grammar) = self.by_file_name.get(name) {
                return Some(*grammar);
            }
        }

        let ext = path.extension()?.to_str()?.to_lowercase();
        self.by_extension.get(&ext).copied()
    }
}

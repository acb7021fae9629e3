use crate::grammar::GrammarTag;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_PATHS: &[&str] = &[
    "include",
    "src",
    "resources",
    "tools",
    "CMakeLists.txt",
    "convert_icon.ps1",
];

/// How the process exit status relates to the outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitPolicy {
    /// Always exit 0, whatever happened.
    #[default]
    AlwaysSuccess,
    /// Exit 1 if any file could not be read or written.
    FailOnError,
    /// Exit 1 if any file changed (or would change on a dry run), 2 on errors.
    FailOnChange,
}

impl fmt::Display for ExitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitPolicy::AlwaysSuccess => "always-success",
            ExitPolicy::FailOnError => "fail-on-error",
            ExitPolicy::FailOnChange => "fail-on-change",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub root_paths: Vec<String>,
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub exit_policy: ExitPolicy,
    #[serde(default)]
    pub dry_run: bool,
    /// Extra or replacement extension mappings, e.g. `asm = "semicolon-style"`.
    #[serde(default)]
    pub extensions: HashMap<String, GrammarTag>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: DEFAULT_ROOT_PATHS.iter().map(|s| s.to_string()).collect(),
            ignore_patterns: Vec::new(),
            exit_policy: ExitPolicy::default(),
            dry_run: false,
            extensions: HashMap::new(),
        }
    }
}

/// Load `Config.toml` (or `path` if given) on top of the built-in defaults,
/// then `DECOMMENTER_*` environment variables.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let roots: Vec<String> = DEFAULT_ROOT_PATHS.iter().map(|s| s.to_string()).collect();
    let mut builder = Config::builder()
        .set_default("root_paths", roots)?
        .set_default("ignore_patterns", Vec::<String>::new())?;

    builder = match path {
        Some(path) => builder.add_source(ConfigFile::from(path).required(true)),
        None => builder.add_source(ConfigFile::with_name("Config").required(false)),
    };

    builder
        .add_source(
            Environment::with_prefix("DECOMMENTER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("root_paths")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?
        .try_deserialize::<AppConfig>()
}

/// Remove paths that live under another path in the list.
pub fn non_overlapping_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for path in paths {
        if result.iter().any(|kept| path.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&path));
        result.push(path);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_overlapping_no_overlap() {
        let paths = vec![
            PathBuf::from("/repo/src"),
            PathBuf::from("/repo/include"),
            PathBuf::from("/repo/CMakeLists.txt"),
        ];
        let result = non_overlapping_paths(paths);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_with_subdirectory() {
        let paths = vec![
            PathBuf::from("/repo/src/ui"),
            PathBuf::from("/repo/src"),
            PathBuf::from("/repo/src/main.cpp"),
            PathBuf::from("/repo/tools"),
        ];
        let result = non_overlapping_paths(paths);
        assert_eq!(
            result,
            vec![PathBuf::from("/repo/src"), PathBuf::from("/repo/tools")]
        );
    }

    #[test]
    fn test_non_overlapping_drops_exact_duplicates() {
        let paths = vec![PathBuf::from("src"), PathBuf::from("src")];
        assert_eq!(non_overlapping_paths(paths), vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_default_config_uses_fixed_roots() {
        let config = AppConfig::default();
        assert_eq!(config.root_paths.len(), DEFAULT_ROOT_PATHS.len());
        assert_eq!(config.exit_policy, ExitPolicy::AlwaysSuccess);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_load_configuration_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decommenter.toml");
        std::fs::write(
            &path,
            r#"
root_paths = ["lib"]
ignore_patterns = ["**/third_party/**"]
exit_policy = "fail-on-change"
dry_run = true

[extensions]
asm = "semicolon-style"
"#,
        )
        .unwrap();

        let config = load_configuration(Some(&path)).unwrap();
        assert_eq!(config.root_paths, vec!["lib".to_string()]);
        assert_eq!(config.ignore_patterns, vec!["**/third_party/**".to_string()]);
        assert_eq!(config.exit_policy, ExitPolicy::FailOnChange);
        assert!(config.dry_run);
        assert_eq!(
            config.extensions.get("asm"),
            Some(&GrammarTag::SemicolonStyle)
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_configuration(Some(&path)).is_err());
    }
}

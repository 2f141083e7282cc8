//! Locating and loading the rule configuration.
//!
//! The first hit wins: `--config` (or `$MODGRAPH_LINT_CONFIG`), then
//! `modgraph-lint.toml` or `.modgraph-lint.toml` in the project directory,
//! then `config.toml` in the global directory (`$MODGRAPH_LINT_CONFIG_DIR`,
//! else `~/.modgraph-lint`). With no file anywhere the built-in
//! `recommended` preset applies.

use modgraph_lint_core::{ConfigError, RuleSet};
use std::fmt;
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_NAMES: [&str; 2] = ["modgraph-lint.toml", ".modgraph-lint.toml"];
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where the rules came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in the environment.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// No file; the `recommended` preset.
    Builtin,
}

impl ConfigSource {
    fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{}", p.display()),
            Self::Project(p) => write!(f, "project config {}", p.display()),
            Self::Global(p) => write!(f, "global config {}", p.display()),
            Self::Builtin => f.write_str("built-in recommended preset"),
        }
    }
}

/// A validated rule set and the file it was read from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Where the rules were found.
    pub source: ConfigSource,
    /// The validated rules.
    pub rules: RuleSet,
}

/// Finds and validates the configuration for a project.
///
/// # Errors
///
/// Any [`ConfigError`] from reading or validating the chosen file. A missing
/// explicit file is an error; missing project and global files are skipped.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_with_global(project_dir, explicit, global_config_dir().as_deref())
}

fn load_with_global(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    let source = locate(project_dir, explicit, global_dir);
    let rules = match source.path() {
        Some(path) => RuleSet::from_file(path)?,
        None => RuleSet::recommended()?,
    };

    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using {source}");
    } else {
        tracing::debug!("Using {source}");
    }
    Ok(LoadedConfig { source, rules })
}

fn locate(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|p| p.is_file())
        .map(ConfigSource::Project)
        .or_else(|| {
            global_dir
                .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
                .filter(|p| p.is_file())
                .map(ConfigSource::Global)
        })
        .unwrap_or(ConfigSource::Builtin)
}

fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("MODGRAPH_LINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".modgraph-lint")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NO_RULES: &str = "preset = \"none\"\n";
    const MINIMAL: &str = "preset = \"minimal\"\n";

    fn rule_names(config: &LoadedConfig) -> Vec<&str> {
        config.rules.forbidden().iter().map(|r| r.name()).collect()
    }

    #[test]
    fn explicit_file_beats_project_file() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("ci.toml");
        fs::write(&explicit, NO_RULES).unwrap();
        fs::write(tmp.path().join("modgraph-lint.toml"), MINIMAL).unwrap();

        let loaded = load_with_global(tmp.path(), Some(&explicit), None).unwrap();
        assert_eq!(loaded.source, ConfigSource::Explicit(explicit));
        assert!(loaded.rules.is_empty());
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.toml");
        let err = load_with_global(tmp.path(), Some(&missing), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn plain_project_name_wins_over_dotted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("modgraph-lint.toml"), MINIMAL).unwrap();
        fs::write(tmp.path().join(".modgraph-lint.toml"), NO_RULES).unwrap();

        let loaded = load_with_global(tmp.path(), None, None).unwrap();
        assert_eq!(
            loaded.source,
            ConfigSource::Project(tmp.path().join("modgraph-lint.toml"))
        );
        assert_eq!(rule_names(&loaded), vec!["not-to-unresolvable", "no-circular"]);
    }

    #[test]
    fn dotted_project_file_is_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".modgraph-lint.toml"), NO_RULES).unwrap();

        let loaded = load_with_global(tmp.path(), None, None).unwrap();
        assert!(matches!(loaded.source, ConfigSource::Project(_)));
        assert!(loaded.rules.is_empty());
    }

    #[test]
    fn global_file_used_only_without_project_file() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), NO_RULES).unwrap();

        let loaded = load_with_global(project.path(), None, Some(global.path())).unwrap();
        assert_eq!(
            loaded.source,
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("modgraph-lint.toml"), MINIMAL).unwrap();
        let loaded = load_with_global(project.path(), None, Some(global.path())).unwrap();
        assert!(matches!(loaded.source, ConfigSource::Project(_)));
    }

    #[test]
    fn falls_back_to_recommended_preset() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let loaded = load_with_global(project.path(), None, Some(global.path())).unwrap();
        assert_eq!(loaded.source, ConfigSource::Builtin);
        assert_eq!(loaded.rules, RuleSet::recommended().unwrap());
        assert_eq!(loaded.source.to_string(), "built-in recommended preset");
    }

    #[test]
    fn invalid_project_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("modgraph-lint.toml"),
            "[[elements]]\ntype = \"app\"\npattern = \"^src/(app\"\n",
        )
        .unwrap();

        let err = load_with_global(tmp.path(), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}

//! Template sources and the user/system data directories they resolve in.

use crate::error::TemplateError;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const USER_DIR_ENV: &str = "JR_USER_DIR";
pub const SYSTEM_DIR_ENV: &str = "JR_SYSTEM_DIR";
const DEFAULT_SYSTEM_DIR: &str = "/usr/share/jr";
const TEMPLATE_EXTENSION: &str = "tpl";

/// User and system data directories.
///
/// Lookups try the user directory first, then the system one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    pub user: PathBuf,
    pub system: PathBuf,
}

impl DataDirs {
    pub fn new(user: impl Into<PathBuf>, system: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            system: system.into(),
        }
    }

    /// `$JR_USER_DIR` (else `<data dir>/jr`) and `$JR_SYSTEM_DIR` (else
    /// `/usr/share/jr`).
    pub fn from_env() -> Self {
        let user = std::env::var_os(USER_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("jr")))
            .unwrap_or_else(|| PathBuf::from(".jr"));
        let system = std::env::var_os(SYSTEM_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSTEM_DIR));
        Self { user, system }
    }

    /// Candidate paths for `file` under `subdir`, user directory first.
    pub fn candidates(&self, subdir: &str, file: &str) -> Vec<PathBuf> {
        vec![
            self.user.join(subdir).join(file),
            self.system.join(subdir).join(file),
        ]
    }

    /// First existing candidate.
    pub fn find(&self, subdir: &str, file: &str) -> Option<PathBuf> {
        self.candidates(subdir, file)
            .into_iter()
            .find(|p| p.is_file())
    }

    pub fn templates_dirs(&self) -> [PathBuf; 2] {
        [self.user.join("templates"), self.system.join("templates")]
    }

    pub fn plugins_dirs(&self) -> [PathBuf; 2] {
        [self.user.join("plugins"), self.system.join("plugins")]
    }

    /// Text of the named template `<dir>/templates/<name>.tpl`.
    pub fn read_template(&self, name: &str) -> Result<String, TemplateError> {
        let file = format!("{name}.{TEMPLATE_EXTENSION}");
        let path = self
            .find("templates", &file)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
                searched: self.candidates("templates", &file),
            })?;
        debug!("Loading template '{}' from {}", name, path.display());
        Ok(std::fs::read_to_string(path)?)
    }

    /// Names of all templates in both directories, sorted and deduplicated.
    pub fn list_templates(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        for dir in self.templates_dirs() {
            names.extend(template_names(&dir)?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

impl Default for DataDirs {
    fn default() -> Self {
        Self::from_env()
    }
}

fn template_names(dir: &Path) -> Result<Vec<String>, TemplateError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    Ok(names)
}

/// Where a template's text comes from.
///
/// In YAML: `{ inline: "{{name}}" }` or `{ named: user }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SourceFields", into = "SourceFields")]
pub enum TemplateSource {
    Inline(String),
    Named(String),
}

/// Map form of [`TemplateSource`]; exactly one field must be set.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    named: Option<String>,
}

impl TryFrom<SourceFields> for TemplateSource {
    type Error = String;

    fn try_from(fields: SourceFields) -> Result<Self, Self::Error> {
        match (fields.inline, fields.named) {
            (Some(text), None) => Ok(TemplateSource::Inline(text)),
            (None, Some(name)) => Ok(TemplateSource::Named(name)),
            (Some(_), Some(_)) => Err("template source sets both 'inline' and 'named'".to_string()),
            (None, None) => Err("template source needs 'inline' or 'named'".to_string()),
        }
    }
}

impl From<TemplateSource> for SourceFields {
    fn from(source: TemplateSource) -> Self {
        match source {
            TemplateSource::Inline(text) => SourceFields {
                inline: Some(text),
                named: None,
            },
            TemplateSource::Named(name) => SourceFields {
                inline: None,
                named: Some(name),
            },
        }
    }
}

impl TemplateSource {
    pub fn inline(text: impl Into<String>) -> Self {
        TemplateSource::Inline(text.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        TemplateSource::Named(name.into())
    }

    pub fn text(&self, dirs: &DataDirs) -> Result<String, TemplateError> {
        match self {
            TemplateSource::Inline(text) => Ok(text.clone()),
            TemplateSource::Named(name) => dirs.read_template(name),
        }
    }

    /// Load and compile. `label` names the template in errors.
    pub fn compile(&self, label: &str, dirs: &DataDirs) -> Result<Template, TemplateError> {
        let text = self.text(dirs)?;
        Template::compile(label, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs_with(user_templates: &[(&str, &str)], system_templates: &[(&str, &str)]) -> (TempDir, DataDirs) {
        let root = TempDir::new().unwrap();
        let dirs = DataDirs::new(root.path().join("user"), root.path().join("system"));
        for (base, templates) in [(&dirs.user, user_templates), (&dirs.system, system_templates)] {
            let dir = base.join("templates");
            std::fs::create_dir_all(&dir).unwrap();
            for (name, text) in templates {
                std::fs::write(dir.join(format!("{name}.tpl")), text).unwrap();
            }
        }
        (root, dirs)
    }

    #[test]
    fn test_user_dir_wins() {
        let (_root, dirs) = dirs_with(&[("user", "from user")], &[("user", "from system"), ("net", "n")]);
        assert_eq!(dirs.read_template("user").unwrap(), "from user");
        assert_eq!(dirs.read_template("net").unwrap(), "n");
        assert_eq!(dirs.list_templates().unwrap(), vec!["net", "user"]);
    }

    #[test]
    fn test_missing_template() {
        let (_root, dirs) = dirs_with(&[], &[]);
        let err = dirs.read_template("nope").unwrap_err();
        match err {
            TemplateError::NotFound { name, searched } => {
                assert_eq!(name, "nope");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_source_from_yaml() {
        let inline: TemplateSource = serde_yaml::from_str("inline: \"{{.V}}\"").unwrap();
        assert_eq!(inline, TemplateSource::inline("{{.V}}"));
        let named: TemplateSource = serde_yaml::from_str("named: user").unwrap();
        assert_eq!(named, TemplateSource::named("user"));

        let flow: TemplateSource = serde_yaml::from_str("{ inline: \"{{uuid}}\" }").unwrap();
        assert_eq!(flow, TemplateSource::inline("{{uuid}}"));
    }

    #[test]
    fn test_source_from_yaml_rejects_ambiguous() {
        assert!(serde_yaml::from_str::<TemplateSource>("{ inline: a, named: b }").is_err());
        assert!(serde_yaml::from_str::<TemplateSource>("{}").is_err());
        assert!(serde_yaml::from_str::<TemplateSource>("{ file: x.tpl }").is_err());
    }

    #[test]
    fn test_source_to_yaml() {
        let yaml = serde_yaml::to_string(&TemplateSource::named("user")).unwrap();
        assert_eq!(yaml.trim(), "named: user");
    }

    #[test]
    fn test_compile_named() {
        let (_root, dirs) = dirs_with(&[("greet", r#"hi {{upper "x"}}"#)], &[]);
        let template = TemplateSource::named("greet").compile("value", &dirs).unwrap();
        assert_eq!(template.name(), "value");
    }
}

use serde::Deserialize;

use crate::engine::Mirror;
use crate::error::MirrorError;
use crate::link::FieldLink;
use crate::normalize::Pipeline;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    pub name: String,
    pub source_a: SourceConfig,
    pub source_b: SourceConfig,
    pub links: Vec<LinkConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// SQLite database file, or directory holding `<table>.csv`.
    pub path: String,
    pub table: String,
    /// SQLite only.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Sqlite,
    Csv,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    /// Applied to both sides before the side-specific steps.
    #[serde(default)]
    pub normalize: Vec<String>,
    #[serde(default)]
    pub normalize_a: Vec<String>,
    #[serde(default)]
    pub normalize_b: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub a: Option<ConfigValue>,
    #[serde(default)]
    pub b: Option<ConfigValue>,
}

/// A literal as written in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}

impl From<&ConfigValue> for Value {
    fn from(v: &ConfigValue) -> Self {
        match v {
            ConfigValue::Integer(n) => Value::Integer(*n),
            ConfigValue::Real(r) => Value::Real(*r),
            ConfigValue::Bool(b) => Value::Integer(i64::from(*b)),
            ConfigValue::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl LinkConfig {
    pub fn to_link(&self) -> Result<FieldLink, MirrorError> {
        let steps_a: Vec<&String> = self.normalize.iter().chain(&self.normalize_a).collect();
        let steps_b: Vec<&String> = self.normalize.iter().chain(&self.normalize_b).collect();
        let pipeline_a = Pipeline::from_names(&steps_a).map_err(|e| self.context(e))?;
        let pipeline_b = Pipeline::from_names(&steps_b).map_err(|e| self.context(e))?;

        let mut link = FieldLink::new(&self.a, &self.b);
        if !pipeline_a.steps().is_empty() {
            link = link.normalize_a(pipeline_a);
        }
        if !pipeline_b.steps().is_empty() {
            link = link.normalize_b(pipeline_b);
        }
        if let Some(ref filter) = self.filter {
            let (Some(a), Some(b)) = (&filter.a, &filter.b) else {
                return Err(self.context(MirrorError::InvalidConfiguration(
                    "filter needs a value for both sides (a and b)".into(),
                )));
            };
            link = link.filter(Value::from(a), Value::from(b));
        }
        if self.identity {
            link = link.identity();
        }
        Ok(link)
    }

    fn context(&self, err: MirrorError) -> MirrorError {
        match err {
            MirrorError::InvalidConfiguration(msg) => MirrorError::InvalidConfiguration(format!(
                "link '{}' <-> '{}': {msg}",
                self.a, self.b
            )),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for the timestamped `_results.csv` report.
    #[serde(default)]
    pub csv_dir: Option<String>,
    /// Explicit CSV report path; overrides `csv_dir`.
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MirrorConfig {
    pub fn from_toml(input: &str) -> Result<Self, MirrorError> {
        let config: MirrorConfig =
            toml::from_str(input).map_err(|e| MirrorError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MirrorError> {
        if self.name.trim().is_empty() {
            return Err(MirrorError::InvalidConfiguration("name must not be empty".into()));
        }

        for (label, source) in [("source_a", &self.source_a), ("source_b", &self.source_b)] {
            if source.path.trim().is_empty() {
                return Err(MirrorError::InvalidConfiguration(format!(
                    "{label}: path must not be empty"
                )));
            }
            if source.table.trim().is_empty() {
                return Err(MirrorError::InvalidConfiguration(format!(
                    "{label}: table must not be empty"
                )));
            }
            if source.kind == SourceKind::Csv && source.busy_timeout_ms.is_some() {
                return Err(MirrorError::InvalidConfiguration(format!(
                    "{label}: busy_timeout_ms only applies to sqlite sources"
                )));
            }
        }

        self.build_mirror().map(|_| ())
    }

    pub fn build_links(&self) -> Result<Vec<FieldLink>, MirrorError> {
        self.links.iter().map(LinkConfig::to_link).collect()
    }

    pub fn build_mirror(&self) -> Result<Mirror, MirrorError> {
        Mirror::new(self.name.clone(), self.build_links()?)
    }

    pub fn identity_count(&self) -> usize {
        self.links.iter().filter(|l| l.identity).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Value normalizers applied before the per-link equality check.
//!
//! Anything implementing [`Normalizer`] can be attached to a link, including
//! plain closures. Configuration files refer to the built-in [`Step`]s by
//! name and chain them into a [`Pipeline`].

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::MirrorError;
use crate::value::Value;

/// A pure `value -> value` transform.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, value: &Value) -> Value;
}

impl<F> Normalizer for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn normalize(&self, value: &Value) -> Value {
        self(value)
    }
}

/// Returns its input unchanged. Default for both sides of every link.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize(&self, value: &Value) -> Value {
        value.clone()
    }
}

pub type SharedNormalizer = Arc<dyn Normalizer>;

pub fn identity() -> SharedNormalizer {
    Arc::new(Identity)
}

// ---------------------------------------------------------------------------
// Built-in steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Identity,
    Trim,
    Lowercase,
    Uppercase,
    /// Keep ASCII digits only.
    Digits,
    /// Render any value as text.
    Text,
    /// Parse text into an integer or real; other kinds pass through.
    Number,
    /// Parse `YYYY-MM-DD` text into a date; other kinds pass through.
    Date,
    EmptyAsNull,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Identity,
        Step::Trim,
        Step::Lowercase,
        Step::Uppercase,
        Step::Digits,
        Step::Text,
        Step::Number,
        Step::Date,
        Step::EmptyAsNull,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Identity => "identity",
            Step::Trim => "trim",
            Step::Lowercase => "lowercase",
            Step::Uppercase => "uppercase",
            Step::Digits => "digits",
            Step::Text => "text",
            Step::Number => "number",
            Step::Date => "date",
            Step::EmptyAsNull => "empty_as_null",
        }
    }

    pub fn from_name(name: &str) -> Result<Step, MirrorError> {
        Step::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Step::ALL.iter().map(Step::name).collect();
                MirrorError::InvalidConfiguration(format!(
                    "unknown normalizer '{name}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }

    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Step::Identity => value.clone(),
            Step::Trim => map_text(value, |s| s.trim().to_string()),
            Step::Lowercase => map_text(value, str::to_lowercase),
            Step::Uppercase => map_text(value, str::to_uppercase),
            Step::Digits => map_text(value, |s| s.chars().filter(|c| c.is_ascii_digit()).collect()),
            Step::Text => match value {
                Value::Null => Value::Null,
                Value::Text(_) => value.clone(),
                other => Value::Text(other.to_string()),
            },
            Step::Number => match value {
                Value::Text(s) => parse_number(s).unwrap_or_else(|| value.clone()),
                other => other.clone(),
            },
            Step::Date => match value {
                Value::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(Value::Date)
                    .unwrap_or_else(|_| value.clone()),
                other => other.clone(),
            },
            Step::EmptyAsNull => match value {
                Value::Text(s) if s.is_empty() => Value::Null,
                other => other.clone(),
            },
        }
    }
}

impl Normalizer for Step {
    fn normalize(&self, value: &Value) -> Value {
        self.apply(value)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn map_text(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::Text(s) => Value::Text(f(s)),
        other => other.clone(),
    }
}

fn parse_number(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::Integer(n));
    }
    trimmed.parse::<f64>().ok().map(Value::Real)
}

/// Built-in steps applied left to right.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Resolve step names, failing on the first unknown one.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, MirrorError> {
        let steps = names
            .iter()
            .map(|n| Step::from_name(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Normalizer for Pipeline {
    fn normalize(&self, value: &Value) -> Value {
        self.steps
            .iter()
            .fold(value.clone(), |acc, step| step.apply(&acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_and_lowercase() {
        let p = Pipeline::from_names(&["trim", "lowercase"]).unwrap();
        assert_eq!(p.normalize(&Value::text(" Foo ")), Value::text("foo"));
        // Non-text values pass through text steps untouched
        assert_eq!(p.normalize(&Value::Integer(3)), Value::Integer(3));
    }

    #[test]
    fn number_and_text_coercions() {
        assert_eq!(Step::Number.apply(&Value::text(" 150 ")), Value::Integer(150));
        assert_eq!(Step::Number.apply(&Value::text("1.5")), Value::Real(1.5));
        assert_eq!(Step::Number.apply(&Value::text("n/a")), Value::text("n/a"));
        assert_eq!(Step::Text.apply(&Value::Integer(150)), Value::text("150"));
        assert_eq!(Step::Text.apply(&Value::Null), Value::Null);
    }

    #[test]
    fn date_and_digits() {
        assert_eq!(
            Step::Date.apply(&Value::text("2026-03-01")),
            Value::Date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
        assert_eq!(Step::Date.apply(&Value::text("03/01/2026")), Value::text("03/01/2026"));
        assert_eq!(Step::Digits.apply(&Value::text("INV-123-AB")), Value::text("123"));
        assert_eq!(Step::EmptyAsNull.apply(&Value::text("")), Value::Null);
    }

    #[test]
    fn unknown_step_is_invalid_configuration() {
        let err = Pipeline::from_names(&["trim", "titlecase"]).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("'titlecase'"));
    }

    #[test]
    fn closures_are_normalizers() {
        let n: SharedNormalizer = Arc::new(|v: &Value| match v {
            Value::Integer(n) => Value::Integer(n / 100),
            other => other.clone(),
        });
        assert_eq!(n.normalize(&Value::Integer(1250)), Value::Integer(12));
        assert_eq!(identity().normalize(&Value::text("x")), Value::text("x"));
    }
}

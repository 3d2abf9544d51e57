//! Client-side form validation.
//!
//! A [`FormSpec`] lists each field with its rules. [`validate`] checks the
//! submitted values and collects every failure into [`FieldErrors`].
//! [`submit`] runs that check before talking to the backend.

mod submit;

pub use submit::{submit, Payload, SubmitError, Submission};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Regex for validating one-time passcodes (6 digits)
    pub static ref OTP_REGEX: Regex = Regex::new(r"^\d{6}$").unwrap();

    /// Regex for validating phone numbers (10 digits, optional +country prefix)
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^(\+\d{1,3})?\d{10}$").unwrap();
}

/// Submitted values, by field name.
pub type Fields = BTreeMap<String, String>;

/// Build [`Fields`] from `(name, value)` pairs.
pub fn fields<K, V, I>(pairs: I) -> Fields
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Email,
    /// At least this many characters, after trimming
    MinLength(usize),
    MaxLength(usize),
    /// Numeric value within the inclusive bounds
    Range { min: f64, max: f64 },
    /// Calendar date in `YYYY-MM-DD` form
    Date,
    Pattern(&'static Regex, &'static str),
}

impl Rule {
    /// Check one value. Rules other than `Required` accept empty values.
    pub fn check(&self, label: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return match self {
                Rule::Required => Err(format!("{} is required", label)),
                _ => Ok(()),
            };
        }

        match self {
            Rule::Required => Ok(()),
            Rule::Email => {
                if EMAIL_REGEX.is_match(value) {
                    Ok(())
                } else {
                    Err("Please enter a valid email address".to_string())
                }
            }
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    Err(format!("{} must be at least {} characters", label, min))
                } else {
                    Ok(())
                }
            }
            Rule::MaxLength(max) => {
                if value.chars().count() > *max {
                    Err(format!("{} is too long (max {} characters)", label, max))
                } else {
                    Ok(())
                }
            }
            Rule::Range { min, max } => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && n >= *min && n <= *max => Ok(()),
                Ok(_) => Err(format!("{} must be between {} and {}", label, min, max)),
                Err(_) => Err(format!("{} must be a number", label)),
            },
            Rule::Date => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(_) => Ok(()),
                Err(_) => Err(format!("{} must be a date (YYYY-MM-DD)", label)),
            },
            Rule::Pattern(regex, message) => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Rule::Range { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    /// Numeric fields are sent as JSON numbers.
    pub fn is_numeric(&self) -> bool {
        self.rules.iter().any(Rule::is_numeric)
    }
}

/// Fields of one form and their rules, in display order.
#[derive(Debug, Clone, Default)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, label: &str, rules: impl Into<Vec<Rule>>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            label: label.to_string(),
            rules: rules.into(),
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Validation failures by field, in the style of the inline messages a form
/// shows under each input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Return Ok(()) if no errors were collected
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    writeln!(f)?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Check `values` against `spec`, reporting every failing rule.
pub fn validate(values: &Fields, spec: &FormSpec) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for field in spec.fields() {
        let value = values.get(&field.name).map(String::as_str).unwrap_or("");
        for rule in &field.rules {
            if let Err(message) = rule.check(&field.label, value) {
                errors.add(field.name.clone(), message);
            }
        }
    }
    errors.finish()
}

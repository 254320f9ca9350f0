//! Options validation.
//!
//! Every options record validates itself with a [`Rules`] collector before it
//! is rendered. Rules never short-circuit: all violations are gathered, in
//! rule order, into one [`ValidationErrors`] value.

use std::fmt;

use thiserror::Error;

use crate::core::identifier::ObjectIdentifier;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid object identifier")]
    InvalidObjectIdentifier,

    #[error("pattern must be specified for LIKE keyword")]
    PatternRequiredForLikeKeyword,

    #[error("scope must be specified for IN keyword")]
    ScopeRequiredForInKeyword,

    #[error("exactly one of {path} {fields:?} must be set")]
    ExactlyOneOf { path: String, fields: Vec<String> },

    #[error("at least one of {path} {fields:?} must be set")]
    AtLeastOneOf { path: String, fields: Vec<String> },

    #[error("{path}: fields {fields:?} are incompatible and cannot be set at the same time")]
    OneOf { path: String, fields: Vec<String> },

    #[error("{path} field: {field} should be set")]
    NotSet { path: String, field: String },

    #[error("{path}.{field} must be between {lo} and {hi}")]
    IntBetween {
        path: String,
        field: String,
        lo: i64,
        hi: i64,
    },

    #[error("{path}.{field} must be greater than or equal to {lo}")]
    IntGreaterOrEqual { path: String, field: String, lo: i64 },
}

fn names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

pub fn err_exactly_one_of(path: &str, fields: &[&str]) -> ValidationError {
    ValidationError::ExactlyOneOf {
        path: path.to_string(),
        fields: names(fields),
    }
}

pub fn err_at_least_one_of(path: &str, fields: &[&str]) -> ValidationError {
    ValidationError::AtLeastOneOf {
        path: path.to_string(),
        fields: names(fields),
    }
}

pub fn err_one_of(path: &str, fields: &[&str]) -> ValidationError {
    ValidationError::OneOf {
        path: path.to_string(),
        fields: names(fields),
    }
}

pub fn err_not_set(path: &str, field: &str) -> ValidationError {
    ValidationError::NotSet {
        path: path.to_string(),
        field: field.to_string(),
    }
}

pub fn err_int_between(path: &str, field: &str, lo: i64, hi: i64) -> ValidationError {
    ValidationError::IntBetween {
        path: path.to_string(),
        field: field.to_string(),
        lo,
        hi,
    }
}

pub fn err_int_greater_or_equal(path: &str, field: &str, lo: i64) -> ValidationError {
    ValidationError::IntGreaterOrEqual {
        path: path.to_string(),
        field: field.to_string(),
        lo,
    }
}

/// All violations found in one options record, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `err` is one of the joined errors.
    pub fn contains(&self, err: &ValidationError) -> bool {
        self.0.contains(err)
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        ValidationErrors(errors)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Whether a field counts as "set" for the mutual-exclusion rules.
///
/// Any `Some` is set, so `Some(false)` counts. Collections and strings are
/// set when non-empty; optional lists go through [`list`].
pub trait Settable {
    fn is_set(&self) -> bool;
}

impl<T> Settable for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }
}

impl<T> Settable for Vec<T> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl Settable for String {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl Settable for bool {
    fn is_set(&self) -> bool {
        *self
    }
}

/// Pair a field name with its value for the multi-field rules.
pub fn field<'a>(name: &'a str, value: &'a dyn Settable) -> (&'a str, &'a dyn Settable) {
    (name, value)
}

/// Pair a field name with an optional list. The list is set only when it
/// holds at least one item.
pub fn list<'a, T>(name: &'a str, value: &'a Option<Vec<T>>) -> (&'a str, &'a dyn Settable) {
    match value {
        Some(items) => (name, items),
        None => (name, &false),
    }
}

/// Collector of rule violations for one record path.
#[derive(Debug)]
pub struct Rules {
    path: String,
    errors: Vec<ValidationError>,
}

impl Rules {
    /// Start collecting for the record named `path`, e.g. `CreateWarehouseOptions`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            errors: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Record an error unconditionally when `violated` holds.
    pub fn check(&mut self, violated: bool, err: ValidationError) -> &mut Self {
        if violated {
            self.errors.push(err);
        }
        self
    }

    pub fn valid_identifier(&mut self, id: &dyn ObjectIdentifier) -> &mut Self {
        self.check(!id.is_valid(), ValidationError::InvalidObjectIdentifier)
    }

    pub fn valid_identifier_if_set<I: ObjectIdentifier>(&mut self, id: Option<&I>) -> &mut Self {
        let invalid = id.is_some_and(|id| !id.is_valid());
        self.check(invalid, ValidationError::InvalidObjectIdentifier)
    }

    /// Every element of a list must be a valid identifier.
    pub fn valid_identifiers<I: ObjectIdentifier>(&mut self, ids: &[I]) -> &mut Self {
        let invalid = ids.iter().any(|id| !id.is_valid());
        self.check(invalid, ValidationError::InvalidObjectIdentifier)
    }

    pub fn exactly_one_of(&mut self, fields: &[(&str, &dyn Settable)]) -> &mut Self {
        let count = set_count(fields);
        let err = err_exactly_one_of(&self.path, &field_names(fields));
        self.check(count != 1, err)
    }

    pub fn at_least_one_of(&mut self, fields: &[(&str, &dyn Settable)]) -> &mut Self {
        let count = set_count(fields);
        let err = err_at_least_one_of(&self.path, &field_names(fields));
        self.check(count == 0, err)
    }

    /// At most one of the fields may be set.
    pub fn one_of(&mut self, fields: &[(&str, &dyn Settable)]) -> &mut Self {
        let count = set_count(fields);
        let err = err_one_of(&self.path, &field_names(fields));
        self.check(count > 1, err)
    }

    pub fn required(&mut self, name: &str, value: &dyn Settable) -> &mut Self {
        let err = err_not_set(&self.path, name);
        self.check(!value.is_set(), err)
    }

    /// Inclusive range check; absent values pass.
    pub fn int_in_range(&mut self, name: &str, value: Option<i64>, lo: i64, hi: i64) -> &mut Self {
        let violated = value.is_some_and(|v| v < lo || v > hi);
        let err = err_int_between(&self.path, name, lo, hi);
        self.check(violated, err)
    }

    /// Lower bound check; absent values pass.
    pub fn int_greater_or_equal(&mut self, name: &str, value: Option<i64>, lo: i64) -> &mut Self {
        let violated = value.is_some_and(|v| v < lo);
        let err = err_int_greater_or_equal(&self.path, name, lo);
        self.check(violated, err)
    }

    /// Run rules for a nested record under `Path.Field`.
    pub fn nested<F>(&mut self, name: &str, build: F) -> &mut Self
    where
        F: FnOnce(&mut Rules),
    {
        let mut inner = Rules::new(format!("{}.{}", self.path, name));
        build(&mut inner);
        self.errors.append(&mut inner.errors);
        self
    }

    /// Merge the outcome of a sub-record's own validator.
    pub fn extend(&mut self, result: Result<(), ValidationErrors>) -> &mut Self {
        if let Err(errs) = result {
            self.errors.extend(errs);
        }
        self
    }

    /// Finish collecting. `Ok` iff no rule was violated.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

fn set_count(fields: &[(&str, &dyn Settable)]) -> usize {
    fields.iter().filter(|(_, v)| v.is_set()).count()
}

fn field_names<'a>(fields: &[(&'a str, &dyn Settable)]) -> Vec<&'a str> {
    fields.iter().map(|(name, _)| *name).collect()
}

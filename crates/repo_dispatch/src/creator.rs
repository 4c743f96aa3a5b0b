//! Default derived-query creator
//!
//! [`MethodNameQueryCreator`] parses query structure out of a method name.
//! The supported shape is a subject prefix, a field list joined by a single
//! combinator, and optional per-field operator suffixes:
//!
//! ```text
//! find_by_name                      -> name == arg0
//! find_by_name_and_age              -> name == arg0 AND age == arg1
//! count_by_age_greater_than         -> count(age > arg0)
//! exists_by_email_containing        -> exists(email contains arg0)
//! ```
//!
//! Every referenced field must exist on the entity and the number of bound
//! arguments must match the declared parameter list; violations are reported
//! as creator errors and abort the repository build.

use repo_kernel::{
    Combinator, ComparisonOperator, Condition, CreatorError, DerivedQuery, EntityMetadata,
    MethodDescriptor, QueryCreator, QueryForm,
};

const SUBJECTS: &[(&str, QueryForm)] = &[
    ("find_all_by_", QueryForm::FindMany),
    ("find_by_", QueryForm::FindMany),
    ("count_by_", QueryForm::Count),
    ("exists_by_", QueryForm::Exists),
];

const OPERATOR_SUFFIXES: &[(&str, ComparisonOperator)] = &[
    ("_greater_than", ComparisonOperator::GreaterThan),
    ("_less_than", ComparisonOperator::LessThan),
    ("_containing", ComparisonOperator::Containing),
];

/// Derives structured queries from method names
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodNameQueryCreator;

impl MethodNameQueryCreator {
    /// Creates the creator
    pub fn new() -> Self {
        Self
    }

    fn parse_condition(
        segment: &str,
        argument: usize,
        method: &MethodDescriptor,
        entity: &EntityMetadata,
    ) -> Result<Condition, CreatorError> {
        let (field, operator) = OPERATOR_SUFFIXES
            .iter()
            .find_map(|(suffix, op)| segment.strip_suffix(suffix).map(|field| (field, *op)))
            .unwrap_or((segment, ComparisonOperator::Equals));

        if field.is_empty() {
            return Err(CreatorError::UnsupportedShape(method.name().to_string()));
        }
        if !entity.has_field(field) {
            return Err(CreatorError::UnknownField {
                field: field.to_string(),
                entity: entity.entity_name().to_string(),
            });
        }
        Ok(Condition::new(field, operator, argument))
    }
}

impl QueryCreator for MethodNameQueryCreator {
    fn create(
        &self,
        method: &MethodDescriptor,
        entity: &EntityMetadata,
    ) -> Result<DerivedQuery, CreatorError> {
        let name = method.name();
        let (rest, form) = SUBJECTS
            .iter()
            .find_map(|(prefix, form)| name.strip_prefix(prefix).map(|rest| (rest, *form)))
            .ok_or_else(|| CreatorError::UnsupportedShape(name.to_string()))?;

        if rest.is_empty() {
            return Err(CreatorError::UnsupportedShape(name.to_string()));
        }

        let has_and = rest.contains("_and_");
        let has_or = rest.contains("_or_");
        if has_and && has_or {
            return Err(CreatorError::MixedCombinators(name.to_string()));
        }
        let (combinator, separator) = if has_or {
            (Combinator::Or, "_or_")
        } else {
            (Combinator::And, "_and_")
        };

        let mut conditions = Vec::new();
        for segment in rest.split(separator) {
            if segment.is_empty() {
                return Err(CreatorError::UnsupportedShape(name.to_string()));
            }
            conditions.push(Self::parse_condition(
                segment,
                conditions.len(),
                method,
                entity,
            )?);
        }

        if conditions.len() != method.arity() {
            return Err(CreatorError::ArityMismatch {
                method: name.to_string(),
                expected: conditions.len(),
                actual: method.arity(),
            });
        }

        Ok(DerivedQuery::new(form, combinator, conditions))
    }
}

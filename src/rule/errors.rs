use crate::metamodel::FeatureKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// An operator was paired with a feature whose kind it cannot handle.
    #[error("Operator '{operator}' cannot be applied to feature '{feature}' of kind {kind}")]
    IncompatibleOperator {
        operator: &'static str,
        feature: String,
        kind: FeatureKind,
    },
}

pub type RuleResult<T> = Result<T, RuleError>;

use crate::ops::{AndOp, OrOp};

/// The fuzzy operators a rulebase evaluates with.
///
/// The default is the classic Mamdani configuration: minimum for the premise
/// conjunction and for implication, maximum for aggregation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InferenceConfig {
    /// Combines the antecedent degrees of a rule into its firing strength.
    pub and_op: AndOp,
    /// Clips a consequent at its rule's firing strength.
    pub implication: AndOp,
    /// Combines the strengths of rules sharing a consequent (height) and
    /// takes the union of clipped consequents (centroid).
    pub or_op: OrOp,
}

impl InferenceConfig {
    pub fn new(and_op: AndOp, implication: AndOp, or_op: OrOp) -> Self {
        Self {
            and_op,
            implication,
            or_op,
        }
    }

    pub fn with_and_op(self, and_op: AndOp) -> Self {
        Self { and_op, ..self }
    }

    pub fn with_implication(self, implication: AndOp) -> Self {
        Self { implication, ..self }
    }

    pub fn with_or_op(self, or_op: OrOp) -> Self {
        Self { or_op, ..self }
    }
}

#[test]
fn test_default_config() {
    let config = InferenceConfig::default();

    assert_eq!(config, InferenceConfig::new(AndOp::Min, AndOp::Min, OrOp::Max));
    assert_eq!(config.with_and_op(AndOp::Prod).and_op, AndOp::Prod);
    assert_eq!(config.with_or_op(OrOp::BoundedSum).or_op, OrOp::BoundedSum);
}

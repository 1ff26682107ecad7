use num::Float;

use crate::error::FuzzyError;

/// And operator (t-norm) for combining the degrees of the antecedents in a
/// rule premise. Also used as the implication operator that clips a
/// consequent at its rule's firing strength.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if v == F::one() {
                    u
                } else if u == F::one() {
                    v
                } else {
                    F::zero()
                }
            },
        }
    }

    /// An empty conjunction is fully true.
    pub fn fold<F: Float>(self, values: impl IntoIterator<Item = F>) -> F {
        values.into_iter().fold(F::one(), |acc, v| self.call(acc, v))
    }
}

/// Or operator (t-conorm) for combining rules that share a consequent and for
/// taking the union of clipped consequents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if v == F::zero() {
                    u
                } else if u == F::zero() {
                    v
                } else {
                    F::one()
                }
            },
        }
    }

    /// An empty disjunction is fully false.
    pub fn fold<F: Float>(self, values: impl IntoIterator<Item = F>) -> F {
        values.into_iter().fold(F::zero(), |acc, v| self.call(acc, v))
    }
}

/// Method for turning the fired rules of a type-1 rulebase into a crisp value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Defuzzification {
    /// Weighted average of each fired consequent's peak
    Height,
    /// Center of area of the aggregated output set, sampled over the output domain
    Centroid,
}

impl TryFrom<u8> for Defuzzification {
    type Error = FuzzyError;

    /// Numeric request modes: 0 is height, 1 is centroid.
    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Self::Height),
            1 => Ok(Self::Centroid),
            _ => Err(FuzzyError::UnknownMode(mode)),
        }
    }
}

#[test]
fn test_and_ops() {
    assert_eq!(AndOp::Min.call(0.3, 0.7), 0.3);
    assert!((AndOp::Prod.call(0.3, 0.7) - 0.21).abs() < 1e-12);
    assert_eq!(AndOp::BoundedProd.call(0.25, 0.5), 0.);
    assert_eq!(AndOp::BoundedProd.call(0.75, 0.5), 0.25);
    assert_eq!(AndOp::DrasticProd.call(1., 0.4), 0.4);
    assert_eq!(AndOp::DrasticProd.call(0.9, 0.4), 0.);

    assert_eq!(AndOp::Min.fold([0.9, 0.3, 0.7]), 0.3);
    assert_eq!(AndOp::Min.fold(std::iter::empty::<f64>()), 1.);
    assert_eq!(AndOp::DrasticProd.fold([0.4]), 0.4);
}

#[test]
fn test_or_ops() {
    assert_eq!(OrOp::Max.call(0.3, 0.7), 0.7);
    assert!((OrOp::ProbOr.call(0.5, 0.5) - 0.75).abs() < 1e-12);
    assert_eq!(OrOp::BoundedSum.call(0.75, 0.5), 1.);
    assert_eq!(OrOp::DrasticSum.call(0., 0.4), 0.4);
    assert_eq!(OrOp::DrasticSum.call(0.1, 0.4), 1.);

    assert_eq!(OrOp::Max.fold([0.2, 0.6, 0.4]), 0.6);
    assert_eq!(OrOp::Max.fold(std::iter::empty::<f64>()), 0.);
    assert_eq!(OrOp::BoundedSum.fold([0.5, 0.25]), 0.75);
}

#[test]
fn test_defuzzification_mode() {
    assert_eq!(Defuzzification::try_from(0), Ok(Defuzzification::Height));
    assert_eq!(Defuzzification::try_from(1), Ok(Defuzzification::Centroid));
    assert_eq!(Defuzzification::try_from(2), Err(FuzzyError::UnknownMode(2)));
}

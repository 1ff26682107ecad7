//! Type-1 and interval type-2 fuzzy inference.
//!
//! A system is a table of [`Variables`] plus a rulebase of conjunctive rules
//! over shared antecedent and consequent terms. Rulebases are immutable once
//! built: every evaluation takes an explicit [`Inputs`] record and returns an
//! [`Outputs`] record, so one rulebase can serve many threads.
//!
//! ```
//! use fuzzy_promotion::{t1, Defuzzification, InferenceConfig, Inputs, MembershipFunction, Variables};
//!
//! # fn main() -> fuzzy_promotion::Result<()> {
//! let mut vars = Variables::new();
//! let temperature = vars.input("temperature", 0. ..=40.)?;
//! let fan = vars.output("fan", 0. ..=100.)?;
//! let mut builder = t1::Rulebase::builder(vars);
//! let hot = builder.antecedent("Hot", MembershipFunction::trapezoidal(20., 30., 40., 40.)?, temperature);
//! let fast = builder.consequent("Fast", MembershipFunction::triangular(50., 100., 100.)?, fan);
//!
//! builder.rule([hot], fast);
//!
//! let rulebase = builder.build(InferenceConfig::default())?;
//! let outputs = rulebase.evaluate(&Inputs::new().with(temperature, 35.), Defuzzification::Height)?;
//!
//! assert_eq!(outputs.get(fan), Some(100.));
//! # Ok(())
//! # }
//! ```
//!
//! [`promotion`] holds ready-made systems for scoring memory page promotion.

mod error;
mod inference;
mod inputs;
pub mod it2;
mod linspace;
mod math;
mod membership;
mod ops;
mod outputs;
pub mod promotion;
mod rules;
pub mod t1;
mod variable;

pub use error::{FuzzyError, Result};
pub use inference::InferenceConfig;
pub use inputs::Inputs;
pub use membership::{Interval, IntervalMf, MembershipFunction, Shape, Side};
pub use ops::{AndOp, Defuzzification, OrOp};
pub use outputs::Outputs;
pub use rules::{Rule, Rules};
pub use variable::{Domain, Input, Output, Variable, VariableKey, Variables, DEFAULT_DISCRETISATION};

#[test]
fn test_rulebases_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<t1::Rulebase>();
    assert_send_sync::<it2::Rulebase>();
    assert_send_sync::<promotion::PromotionT1>();
    assert_send_sync::<promotion::PromotionIt2>();
}

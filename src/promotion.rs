//! Ready-made systems scoring how strongly a memory page should be promoted
//! to a faster tier, from how recently it was accessed and how often it is
//! read and written. Every variable ranges over `[0, 10]`.

use crate::error::{FuzzyError, Result};
use crate::inference::InferenceConfig;
use crate::inputs::Inputs;
use crate::it2::{self, CentroidInterval};
use crate::membership::{IntervalMf, MembershipFunction};
use crate::ops::Defuzzification;
use crate::outputs::Outputs;
use crate::t1;
use crate::variable::{Input, Output, Variable, Variables};

pub const RECENCY: &str = "Recency of Access Level";
pub const READS: &str = "Read Frequency Level";
pub const WRITES: &str = "Write Frequency Level";
pub const PROMOTION: &str = "Promotion";

/// A linguistic level shared by every promotion variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Medium, Level::High];
}

use Level::{High as H, Low as L, Medium as M};

/// `[recency, reads, writes] => promotion`. A high recency level means the
/// page was accessed recently.
pub const RULE_TABLE: [([Level; 3], Level); 27] = [
    ([H, L, L], L),
    ([H, L, M], M),
    ([H, L, H], H),
    ([H, M, L], L),
    ([H, M, M], H),
    ([H, M, H], H),
    ([H, H, L], L),
    ([H, H, M], M),
    ([H, H, H], H),
    ([M, L, L], L),
    ([M, L, M], M),
    ([M, L, H], H),
    ([M, M, L], L),
    ([M, M, M], M),
    ([M, M, H], H),
    ([M, H, L], L),
    ([M, H, M], M),
    ([M, H, H], H),
    ([L, L, L], L),
    ([L, L, M], L),
    ([L, L, H], M),
    ([L, M, L], L),
    ([L, M, M], L),
    ([L, M, H], M),
    ([L, H, L], L),
    ([L, H, M], L),
    ([L, H, H], M),
];

/// One term key per level.
struct Terms<K>([K; 3]);

impl<K: Copy> Terms<K> {
    fn get(&self, level: Level) -> K {
        self.0[level as usize]
    }
}

/// Handles to the variables of a promotion system.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PromotionVariables {
    pub recency: Variable<Input>,
    pub reads: Variable<Input>,
    pub writes: Variable<Input>,
    pub promotion: Variable<Output>,
}

impl PromotionVariables {
    fn declare() -> Result<(Variables, Self)> {
        let mut vars = Variables::new();
        let handles = Self {
            recency: vars.input(RECENCY, 0. ..=10.)?,
            reads: vars.input(READS, 0. ..=10.)?,
            writes: vars.input(WRITES, 0. ..=10.)?,
            promotion: vars.output(PROMOTION, 0. ..=10.)?,
        };

        Ok((vars, handles))
    }

    pub fn inputs(&self, recency: f64, reads: f64, writes: f64) -> Inputs {
        Inputs::new()
            .with(self.recency, recency)
            .with(self.reads, reads)
            .with(self.writes, writes)
    }
}

fn promotion_of(outputs: &Outputs, var: Variable<Output>) -> Result<f64> {
    outputs.get(var).ok_or_else(|| FuzzyError::UndefinedDefuzzification {
        variable: PROMOTION.into(),
    })
}

/// The type-1 promotion system.
pub struct PromotionT1 {
    rulebase: t1::Rulebase,
    variables: PromotionVariables,
}

impl PromotionT1 {
    pub fn new() -> Result<Self> {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Result<Self> {
        let (vars, variables) = PromotionVariables::declare()?;
        let mut builder = t1::Rulebase::builder_with_capacity(vars, RULE_TABLE.len());
        let recency = Terms([
            builder.antecedent("LowROA", MembershipFunction::trapezoidal(4., 6., 10., 10.)?, variables.recency),
            builder.antecedent("MediumROA", MembershipFunction::triangular(2., 4., 6.)?, variables.recency),
            builder.antecedent("HighROA", MembershipFunction::trapezoidal(0., 0., 2., 4.)?, variables.recency),
        ]);
        let reads = Terms([
            builder.antecedent("LowRF", MembershipFunction::trapezoidal(0., 0., 2., 5.)?, variables.reads),
            builder.antecedent("MediumRF", MembershipFunction::trapezoidal(2., 4., 6., 8.)?, variables.reads),
            builder.antecedent("HighRF", MembershipFunction::trapezoidal(5., 8., 10., 10.)?, variables.reads),
        ]);
        let writes = Terms([
            builder.antecedent("LowWF", MembershipFunction::trapezoidal(0., 0., 2., 5.)?, variables.writes),
            builder.antecedent("MediumWF", MembershipFunction::trapezoidal(2., 4., 6., 8.)?, variables.writes),
            builder.antecedent("HighWF", MembershipFunction::trapezoidal(5., 8., 10., 10.)?, variables.writes),
        ]);
        let promotion = Terms([
            builder.consequent("LowPromotion", MembershipFunction::triangular(0., 0., 5.)?, variables.promotion),
            builder.consequent("MediumPromotion", MembershipFunction::triangular(0., 5., 10.)?, variables.promotion),
            builder.consequent("HighPromotion", MembershipFunction::triangular(5., 10., 10.)?, variables.promotion),
        ]);

        for ([r, rd, w], p) in RULE_TABLE {
            builder.rule([recency.get(r), reads.get(rd), writes.get(w)], promotion.get(p));
        }

        Ok(Self {
            rulebase: builder.build(config)?,
            variables,
        })
    }

    pub fn variables(&self) -> PromotionVariables {
        self.variables
    }

    pub fn rulebase(&self) -> &t1::Rulebase {
        &self.rulebase
    }

    pub fn promotion(&self, recency: f64, reads: f64, writes: f64, defuzzification: Defuzzification) -> Result<f64> {
        let inputs = self.variables.inputs(recency, reads, writes);
        let outputs = self.rulebase.evaluate(&inputs, defuzzification)?;

        promotion_of(&outputs, self.variables.promotion)
    }

    /// `mode` 0 selects height defuzzification, 1 centroid.
    pub fn promotion_with_mode(&self, recency: f64, reads: f64, writes: f64, mode: u8) -> Result<f64> {
        self.promotion(recency, reads, writes, Defuzzification::try_from(mode)?)
    }
}

fn interval_set(upper: [f64; 4], lower: [f64; 4], lower_scale: f64) -> Result<IntervalMf> {
    let [a, b, c, d] = upper;
    let upper = MembershipFunction::trapezoidal(a, b, c, d)?;
    let [a, b, c, d] = lower;
    let lower = MembershipFunction::trapezoidal(a, b, c, d)?.scaled(lower_scale)?;

    IntervalMf::new(upper, lower)
}

/// The interval type-2 promotion system. Its terms widen the type-1 ones by
/// about half a unit on each flank; lower sets peak at 0.9.
pub struct PromotionIt2 {
    rulebase: it2::Rulebase,
    variables: PromotionVariables,
}

impl PromotionIt2 {
    pub fn new() -> Result<Self> {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Result<Self> {
        let (vars, variables) = PromotionVariables::declare()?;
        let mut builder = it2::Rulebase::builder_with_capacity(vars, RULE_TABLE.len());
        let recency = Terms([
            builder.antecedent(
                "LowROA",
                interval_set([3.5, 5.5, 10., 10.], [4.5, 6.5, 10., 10.], 0.9)?,
                variables.recency,
            ),
            builder.antecedent(
                "MediumROA",
                interval_set([1.5, 3.5, 4.5, 6.5], [2.5, 3.99, 4.01, 5.5], 0.8)?,
                variables.recency,
            ),
            builder.antecedent(
                "HighROA",
                interval_set([0., 0., 2.5, 4.5], [0., 0., 1.5, 3.5], 0.9)?,
                variables.recency,
            ),
        ]);
        let mut frequency = |prefix: &str, var: Variable<Input>| -> Result<Terms<it2::AntecedentKey>> {
            Ok(Terms([
                builder.antecedent(
                    format!("Low{prefix}"),
                    interval_set([0., 0., 2.5, 5.5], [0., 0., 1.5, 4.5], 0.9)?,
                    var,
                ),
                builder.antecedent(
                    format!("Medium{prefix}"),
                    interval_set([1.5, 3.5, 6.5, 8.5], [2.5, 4.5, 5.5, 7.5], 0.9)?,
                    var,
                ),
                builder.antecedent(
                    format!("High{prefix}"),
                    interval_set([4.5, 7.5, 10., 10.], [5.5, 8.5, 10., 10.], 0.9)?,
                    var,
                ),
            ]))
        };
        let reads = frequency("RF", variables.reads)?;
        let writes = frequency("WF", variables.writes)?;
        let promotion = Terms([
            builder.consequent(
                "LowPromotion",
                interval_set([0., 0., 0.5, 5.5], [0., 0., 0., 4.5], 0.9)?,
                variables.promotion,
            ),
            builder.consequent(
                "MediumPromotion",
                interval_set([-0.5, 4.5, 5.5, 10.5], [0.5, 4.5, 5.5, 9.5], 0.9)?,
                variables.promotion,
            ),
            builder.consequent(
                "HighPromotion",
                interval_set([4.5, 9.5, 12.5, 14.], [5.5, 10.5, 11.5, 13.], 0.9)?,
                variables.promotion,
            ),
        ]);

        for ([r, rd, w], p) in RULE_TABLE {
            builder.rule([recency.get(r), reads.get(rd), writes.get(w)], promotion.get(p));
        }

        Ok(Self {
            rulebase: builder.build(config)?,
            variables,
        })
    }

    pub fn variables(&self) -> PromotionVariables {
        self.variables
    }

    pub fn rulebase(&self) -> &it2::Rulebase {
        &self.rulebase
    }

    /// The type-reduced interval; its midpoint is [`PromotionIt2::promotion`].
    pub fn interval(&self, recency: f64, reads: f64, writes: f64) -> Result<CentroidInterval> {
        let inputs = self.variables.inputs(recency, reads, writes);
        let outputs = self.rulebase.evaluate(&inputs)?;

        outputs
            .interval(self.variables.promotion)
            .ok_or_else(|| FuzzyError::UndefinedDefuzzification {
                variable: PROMOTION.into(),
            })
    }

    pub fn promotion(&self, recency: f64, reads: f64, writes: f64) -> Result<f64> {
        let inputs = self.variables.inputs(recency, reads, writes);
        let outputs = self.rulebase.evaluate(&inputs)?;

        promotion_of(&outputs, self.variables.promotion)
    }
}

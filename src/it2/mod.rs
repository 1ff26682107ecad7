//! Interval type-2 pipeline: firing intervals, aggregation of the lower and
//! upper halves, and Karnik–Mendel type reduction.

use std::collections::HashMap;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::inference::InferenceConfig;
use crate::inputs::Inputs;
use crate::membership::{Interval, IntervalMf};
use crate::outputs::Outputs;
use crate::rules::Rules;
use crate::variable::{Input, Kind, Output, TableId, Variable, Variables};

mod karnik_mendel;

pub use self::karnik_mendel::{karnik_mendel, CentroidInterval, TypeReduction};

new_key_type! {
    struct AntecedentSlot;
    struct ConsequentSlot;
}

/// Handle to an antecedent shared between interval type-2 rules
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AntecedentKey {
    slot: AntecedentSlot,
    table: TableId,
}

/// Handle to a consequent shared between interval type-2 rules
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConsequentKey {
    slot: ConsequentSlot,
    table: TableId,
}

#[derive(Clone, Debug)]
pub struct Antecedent {
    label: String,
    membership: IntervalMf,
    variable: Variable<Input>,
}

impl Antecedent {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership(&self) -> &IntervalMf {
        &self.membership
    }

    pub fn variable(&self) -> Variable<Input> {
        self.variable
    }

    pub fn fire(&self, input_value: f64) -> Interval {
        self.membership.evaluate(input_value)
    }
}

#[derive(Clone, Debug)]
pub struct Consequent {
    label: String,
    membership: IntervalMf,
    variable: Variable<Output>,
}

impl Consequent {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership(&self) -> &IntervalMf {
        &self.membership
    }

    pub fn variable(&self) -> Variable<Output> {
        self.variable
    }
}

/// Collects the terms and rules of an interval type-2 system.
pub struct Builder {
    variables: Variables,
    antecedents: SlotMap<AntecedentSlot, Antecedent>,
    consequents: SlotMap<ConsequentSlot, Consequent>,
    rules: Rules<AntecedentKey, ConsequentKey>,
}

impl Builder {
    pub fn antecedent(
        &mut self,
        label: impl Into<String>,
        membership: IntervalMf,
        variable: Variable<Input>,
    ) -> AntecedentKey {
        let slot = self.antecedents.insert(Antecedent {
            label: label.into(),
            membership,
            variable,
        });

        AntecedentKey {
            slot,
            table: self.variables.table(),
        }
    }

    pub fn consequent(
        &mut self,
        label: impl Into<String>,
        membership: IntervalMf,
        variable: Variable<Output>,
    ) -> ConsequentKey {
        let slot = self.consequents.insert(Consequent {
            label: label.into(),
            membership,
            variable,
        });

        ConsequentKey {
            slot,
            table: self.variables.table(),
        }
    }

    pub fn rule(&mut self, antecedents: impl IntoIterator<Item = AntecedentKey>, consequent: ConsequentKey) -> &mut Self {
        self.rules.add(antecedents, consequent);
        self
    }

    /// Besides the checks of the type-1 builder, every set must keep its lower
    /// membership under its upper membership at each sample of its variable.
    pub fn build(self, config: InferenceConfig) -> Result<Rulebase> {
        let table = self.variables.table();

        for antecedent in self.antecedents.values() {
            let var = self.variables.get(antecedent.variable, Kind::Input)?;

            check_footprint(&antecedent.label, &antecedent.membership, var.universe())?;
        }

        for consequent in self.consequents.values() {
            let var = self.variables.get(consequent.variable, Kind::Output)?;

            check_footprint(&consequent.label, &consequent.membership, var.universe())?;
        }

        let mut fired = Vec::with_capacity(self.antecedents.len());
        let mut outputs = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.antecedents.is_empty() {
                return Err(FuzzyError::EmptyRule { index });
            }

            for key in &rule.antecedents {
                if key.table != table || !self.antecedents.contains_key(key.slot) {
                    return Err(FuzzyError::UnknownHandle);
                }
                if !fired.contains(&key.slot) {
                    fired.push(key.slot);
                }
            }

            if rule.consequent.table != table {
                return Err(FuzzyError::UnknownHandle);
            }

            let consequent = self
                .consequents
                .get(rule.consequent.slot)
                .ok_or(FuzzyError::UnknownHandle)?;

            if !outputs.contains(&consequent.variable) {
                outputs.push(consequent.variable);
            }
        }

        tracing::debug!(
            rules = self.rules.len(),
            antecedents = self.antecedents.len(),
            consequents = self.consequents.len(),
            ?config,
            "built interval type-2 rulebase"
        );

        Ok(Rulebase {
            variables: self.variables,
            antecedents: self.antecedents,
            consequents: self.consequents,
            rules: self.rules,
            config,
            fired,
            outputs,
        })
    }
}

fn check_footprint(label: &str, membership: &IntervalMf, points: impl IntoIterator<Item = f64>) -> Result<()> {
    membership.check_footprint(points).map_err(|err| match err {
        FuzzyError::MalformedMembershipFunction(reason) => {
            FuzzyError::MalformedMembershipFunction(format!("{label}: {reason}"))
        },
        err => err,
    })
}

/// An immutable interval type-2 rule set. Only centroid output is defined.
pub struct Rulebase {
    variables: Variables,
    antecedents: SlotMap<AntecedentSlot, Antecedent>,
    consequents: SlotMap<ConsequentSlot, Consequent>,
    rules: Rules<AntecedentKey, ConsequentKey>,
    config: InferenceConfig,
    fired: Vec<AntecedentSlot>,
    outputs: Vec<Variable<Output>>,
}

impl Rulebase {
    pub fn builder(variables: Variables) -> Builder {
        Self::builder_with_capacity(variables, 0)
    }

    pub fn builder_with_capacity(variables: Variables, capacity: usize) -> Builder {
        Builder {
            variables,
            antecedents: SlotMap::with_key(),
            consequents: SlotMap::with_key(),
            rules: Rules::with_capacity(capacity),
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn config(&self) -> InferenceConfig {
        self.config
    }

    pub fn rules(&self) -> &Rules<AntecedentKey, ConsequentKey> {
        &self.rules
    }

    pub fn antecedent(&self, key: AntecedentKey) -> Option<&Antecedent> {
        if key.table != self.variables.table() {
            return None;
        }

        self.antecedents.get(key.slot)
    }

    pub fn consequent(&self, key: ConsequentKey) -> Option<&Consequent> {
        if key.table != self.variables.table() {
            return None;
        }

        self.consequents.get(key.slot)
    }

    /// The firing interval of every rule, in rule order. The lower bound
    /// conjoins the lower memberships and the upper bound the upper ones.
    pub fn rule_intervals(&self, inputs: &Inputs) -> Result<Vec<Interval>> {
        inputs.ensure_table(&self.variables)?;

        let mut degrees = SecondaryMap::with_capacity(self.fired.len());

        for &slot in &self.fired {
            let antecedent = &self.antecedents[slot];
            let value = inputs.crisp(&self.variables, antecedent.variable)?;

            degrees.insert(slot, antecedent.fire(value));
        }

        let and_op = self.config.and_op;
        let intervals = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let interval = Interval {
                    lower: and_op.fold(rule.antecedents.iter().map(|key| degrees[key.slot].lower)),
                    upper: and_op.fold(rule.antecedents.iter().map(|key| degrees[key.slot].upper)),
                };

                tracing::trace!(rule = i, lower = interval.lower, upper = interval.upper, "rule fired");

                interval
            })
            .collect();

        Ok(intervals)
    }

    pub fn evaluate(&self, inputs: &Inputs) -> Result<Outputs> {
        let intervals = self.rule_intervals(inputs)?;
        let mut type_reduced = HashMap::with_capacity(self.outputs.len());

        for &output in &self.outputs {
            let var = self.variables.get(output, Kind::Output)?;
            let Some(reduced) = self.type_reduce(output, var.universe(), &intervals) else {
                tracing::debug!(variable = %var.name, "no rule fired");

                return Err(FuzzyError::UndefinedDefuzzification {
                    variable: var.name.clone(),
                });
            };

            type_reduced.insert(output, reduced.centroid);
        }

        Ok(Outputs::from_type_reduced(type_reduced))
    }

    fn type_reduce(
        &self,
        output: Variable<Output>,
        universe: impl Iterator<Item = f64>,
        intervals: &[Interval],
    ) -> Option<TypeReduction> {
        let InferenceConfig {
            implication, or_op, ..
        } = self.config;
        let clipped: Vec<(&IntervalMf, Interval)> = self
            .rules
            .iter()
            .zip(intervals)
            .filter_map(|(rule, &interval)| {
                let consequent = &self.consequents[rule.consequent.slot];

                (consequent.variable == output).then_some((&consequent.membership, interval))
            })
            .collect();

        let samples: Vec<f64> = universe.collect();
        let lower: Vec<f64> = samples
            .iter()
            .map(|&y| {
                or_op.fold(
                    clipped
                        .iter()
                        .map(|(mf, fired)| implication.call(fired.lower, mf.lower().evaluate(y))),
                )
            })
            .collect();
        let upper: Vec<f64> = samples
            .iter()
            .map(|&y| {
                or_op.fold(
                    clipped
                        .iter()
                        .map(|(mf, fired)| implication.call(fired.upper, mf.upper().evaluate(y))),
                )
            })
            .collect();

        karnik_mendel(&samples, &lower, &upper)
    }
}

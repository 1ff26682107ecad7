//! Type-1 pipeline: scalar firing strengths, height and centroid defuzzification.

use std::collections::HashMap;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::inference::InferenceConfig;
use crate::inputs::Inputs;
use crate::linspace::Linspace;
use crate::math::weighted_mean;
use crate::membership::MembershipFunction;
use crate::ops::Defuzzification;
use crate::outputs::Outputs;
use crate::rules::Rules;
use crate::variable::{Input, Kind, Output, TableId, Variable, Variables};

new_key_type! {
    struct AntecedentSlot;
    struct ConsequentSlot;
}

/// Handle to an antecedent shared between type-1 rules
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AntecedentKey {
    slot: AntecedentSlot,
    table: TableId,
}

/// Handle to a consequent shared between type-1 rules
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConsequentKey {
    slot: ConsequentSlot,
    table: TableId,
}

/// "input IS set"
#[derive(Clone, Debug)]
pub struct Antecedent {
    label: String,
    membership: MembershipFunction,
    variable: Variable<Input>,
}

impl Antecedent {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership(&self) -> &MembershipFunction {
        &self.membership
    }

    pub fn variable(&self) -> Variable<Input> {
        self.variable
    }

    pub fn fire(&self, input_value: f64) -> f64 {
        self.membership.evaluate(input_value)
    }
}

/// "output IS set"
#[derive(Clone, Debug)]
pub struct Consequent {
    label: String,
    membership: MembershipFunction,
    variable: Variable<Output>,
}

impl Consequent {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership(&self) -> &MembershipFunction {
        &self.membership
    }

    pub fn variable(&self) -> Variable<Output> {
        self.variable
    }
}

/// Collects the terms and rules of a type-1 system. Nothing is checked until
/// [`Builder::build`].
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
        membership: MembershipFunction,
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
        membership: MembershipFunction,
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

    /// Fails with [`FuzzyError::UnknownHandle`] when a term is bound to a
    /// variable of another table or a rule names a term of another builder.
    pub fn build(self, config: InferenceConfig) -> Result<Rulebase> {
        let table = self.variables.table();

        for antecedent in self.antecedents.values() {
            self.variables.get(antecedent.variable, Kind::Input)?;
        }

        for consequent in self.consequents.values() {
            self.variables.get(consequent.variable, Kind::Output)?;
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
            "built type-1 rulebase"
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

/// An immutable type-1 rule set. Evaluation takes the inputs explicitly, so a
/// rulebase can be shared between threads without locking.
pub struct Rulebase {
    variables: Variables,
    antecedents: SlotMap<AntecedentSlot, Antecedent>,
    consequents: SlotMap<ConsequentSlot, Consequent>,
    rules: Rules<AntecedentKey, ConsequentKey>,
    config: InferenceConfig,
    // Antecedents referenced by at least one rule
    fired: Vec<AntecedentSlot>,
    // Outputs concluded by at least one rule, in rule order
    outputs: Vec<Variable<Output>>,
}

impl Rulebase {
    pub fn builder(variables: Variables) -> Builder {
        Self::builder_with_capacity(variables, 0)
    }

    /// `capacity` is the expected number of rules.
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

    /// The firing strength of every rule, in rule order.
    pub fn rule_strengths(&self, inputs: &Inputs) -> Result<Vec<f64>> {
        inputs.ensure_table(&self.variables)?;

        let mut degrees = SecondaryMap::with_capacity(self.fired.len());

        for &slot in &self.fired {
            let antecedent = &self.antecedents[slot];
            let value = inputs.crisp(&self.variables, antecedent.variable)?;

            degrees.insert(slot, antecedent.fire(value));
        }

        let strengths = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let strength = self.config.and_op.fold(rule.antecedents.iter().map(|key| degrees[key.slot]));

                tracing::trace!(rule = i, strength, "rule fired");

                strength
            })
            .collect();

        Ok(strengths)
    }

    pub fn evaluate(&self, inputs: &Inputs, defuzzification: Defuzzification) -> Result<Outputs> {
        let strengths = self.rule_strengths(inputs)?;
        let mut defuzzified = HashMap::with_capacity(self.outputs.len());

        for &output in &self.outputs {
            let var = self.variables.get(output, Kind::Output)?;
            let value = match defuzzification {
                Defuzzification::Height => self.height(output, &strengths),
                Defuzzification::Centroid => self.centroid(output, var.universe(), &strengths),
            };
            let Some(value) = value else {
                tracing::debug!(variable = %var.name, ?defuzzification, "no rule fired");

                return Err(FuzzyError::UndefinedDefuzzification {
                    variable: var.name.clone(),
                });
            };

            defuzzified.insert(output, value);
        }

        Ok(Outputs::new(defuzzified))
    }

    fn height(&self, output: Variable<Output>, strengths: &[f64]) -> Option<f64> {
        let mut combined = SecondaryMap::with_capacity(self.consequents.len());

        for (rule, &strength) in self.rules.iter().zip(strengths) {
            let slot = rule.consequent.slot;

            if self.consequents[slot].variable != output {
                continue;
            }

            let strength = match combined.get(slot) {
                Some(&previous) => self.config.or_op.call(previous, strength),
                None => strength,
            };

            combined.insert(slot, strength);
        }

        weighted_mean(
            combined
                .iter()
                .map(|(slot, &strength)| (self.consequents[slot].membership.peak(), strength)),
        )
    }

    fn centroid(&self, output: Variable<Output>, universe: Linspace, strengths: &[f64]) -> Option<f64> {
        let clipped: Vec<(&MembershipFunction, f64)> = self
            .rules
            .iter()
            .zip(strengths)
            .filter_map(|(rule, &strength)| {
                let consequent = &self.consequents[rule.consequent.slot];

                (consequent.variable == output).then_some((&consequent.membership, strength))
            })
            .collect();

        weighted_mean(universe.map(|y| {
            let membership = self.config.or_op.fold(
                clipped
                    .iter()
                    .map(|(mf, strength)| self.config.implication.call(*strength, mf.evaluate(y))),
            );

            (y, membership)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{AndOp, OrOp};

    struct System {
        rulebase: Rulebase,
        x: Variable<Input>,
        y: Variable<Input>,
        out: Variable<Output>,
    }

    // IF x IS around-ten AND y IS around-ten THEN out IS middle
    fn single_rule(config: InferenceConfig) -> System {
        let mut vars = Variables::new();
        let x = vars.input("x", 0. ..=20.).unwrap();
        let y = vars.input("y", 0. ..=20.).unwrap();
        let out = vars.output("out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder(vars);
        let x_ten = builder.antecedent("XTen", MembershipFunction::triangular(0., 10., 20.).unwrap(), x);
        let y_ten = builder.antecedent("YTen", MembershipFunction::triangular(0., 10., 20.).unwrap(), y);
        let middle = builder.consequent("Middle", MembershipFunction::triangular(0., 5., 10.).unwrap(), out);

        builder.rule([x_ten, y_ten], middle);

        System {
            rulebase: builder.build(config).unwrap(),
            x,
            y,
            out,
        }
    }

    #[test]
    fn test_rule_strength_is_minimum() {
        let System { rulebase, x, y, .. } = single_rule(InferenceConfig::default());
        let inputs = Inputs::new().with(x, 3.).with(y, 7.);

        assert_eq!(rulebase.rule_strengths(&inputs), Ok(vec![0.3]));
    }

    #[test]
    fn test_rule_strength_with_product() {
        let System { rulebase, x, y, .. } = single_rule(InferenceConfig::default().with_and_op(AndOp::Prod));
        let inputs = Inputs::new().with(x, 3.).with(y, 7.);
        let strengths = rulebase.rule_strengths(&inputs).unwrap();

        assert!((strengths[0] - 0.21).abs() < 1e-12);
    }

    #[test]
    fn test_antecedent_fire() {
        let System { rulebase, .. } = single_rule(InferenceConfig::default());
        let (_, antecedent) = rulebase.antecedents.iter().next().unwrap();

        assert_eq!(antecedent.label(), "XTen");
        assert_eq!(antecedent.fire(10.), 1.);
        assert_eq!(antecedent.fire(15.), 0.5);
    }

    #[test]
    fn test_height_single_rule() {
        let System { rulebase, x, y, out } = single_rule(InferenceConfig::default());
        let full = Inputs::new().with(x, 10.).with(y, 10.);
        let partial = Inputs::new().with(x, 3.).with(y, 7.);

        let outputs = rulebase.evaluate(&full, Defuzzification::Height).unwrap();

        assert_eq!(outputs.get(out), Some(5.));
        assert_eq!(outputs.interval(out), None);

        let outputs = rulebase.evaluate(&partial, Defuzzification::Height).unwrap();

        assert!((outputs.get(out).unwrap() - 5.).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_symmetric_triangle() {
        let System { rulebase, x, y, out } = single_rule(InferenceConfig::default());
        let inputs = Inputs::new().with(x, 10.).with(y, 10.);
        let outputs = rulebase.evaluate(&inputs, Defuzzification::Centroid).unwrap();

        assert!((outputs.get(out).unwrap() - 5.).abs() < 1e-9);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_nothing_fired() {
        let System { rulebase, x, y, .. } = single_rule(InferenceConfig::default());
        let inputs = Inputs::new().with(x, 0.).with(y, 10.);
        let undefined = Err(FuzzyError::UndefinedDefuzzification { variable: "out".into() });

        assert_eq!(rulebase.evaluate(&inputs, Defuzzification::Height), undefined);
        assert_eq!(rulebase.evaluate(&inputs, Defuzzification::Centroid), undefined);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let System { rulebase, x, y, .. } = single_rule(InferenceConfig::default());

        assert_eq!(
            rulebase.evaluate(&Inputs::new().with(x, 25.).with(y, 10.), Defuzzification::Height),
            Err(FuzzyError::Domain {
                variable: "x".into(),
                value: 25.,
                lower: 0.,
                upper: 20.,
            })
        );
        assert_eq!(
            rulebase.evaluate(&Inputs::new().with(x, 10.), Defuzzification::Centroid),
            Err(FuzzyError::MissingInput("y".into()))
        );
    }

    // Three rules over one input at x = 3: two share the Low consequent with
    // strengths 0.3 and 0.6, the third concludes High with strength 0.7
    fn shared_consequents(or_op: OrOp) -> f64 {
        let mut vars = Variables::new();
        let x = vars.input("x", 0. ..=10.).unwrap();
        let out = vars.output("out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder_with_capacity(vars, 3);
        let weak = builder.antecedent("Weak", MembershipFunction::triangular(0., 10., 20.).unwrap(), x);
        let medium = builder.antecedent("Medium", MembershipFunction::triangular(0., 5., 10.).unwrap(), x);
        let strong = builder.antecedent("Strong", MembershipFunction::triangular(-4., 6., 16.).unwrap(), x);
        let low = builder.consequent("Low", MembershipFunction::triangular(0., 0., 5.).unwrap(), out);
        let high = builder.consequent("High", MembershipFunction::triangular(5., 10., 10.).unwrap(), out);

        builder.rule([weak], low).rule([medium], low).rule([strong], high);

        let rulebase = builder.build(InferenceConfig::default().with_or_op(or_op)).unwrap();
        let outputs = rulebase
            .evaluate(&Inputs::new().with(x, 3.), Defuzzification::Height)
            .unwrap();

        outputs.get(out).unwrap()
    }

    #[test]
    fn test_height_shared_consequents() {
        assert!((shared_consequents(OrOp::Max) - 7. / 1.3).abs() < 1e-12);
        assert!((shared_consequents(OrOp::BoundedSum) - 7. / 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_build_errors() {
        let mut vars = Variables::new();
        let x = vars.input("x", 0. ..=10.).unwrap();
        let out = vars.output("out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder(vars);
        let low = builder.consequent("Low", MembershipFunction::triangular(0., 0., 5.).unwrap(), out);

        builder.rule([], low);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::EmptyRule { index: 0 })
        ));

        let mut other = Rulebase::builder(Variables::new());
        let mut vars = Variables::new();
        let foreign_x = vars.input("x", 0. ..=10.).unwrap();
        let foreign = other.antecedent("Foreign", MembershipFunction::triangular(0., 0., 5.).unwrap(), foreign_x);
        let mut vars = Variables::new();
        let out = vars.output("out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder(vars);
        let low = builder.consequent("Low", MembershipFunction::triangular(0., 0., 5.).unwrap(), out);

        builder.rule([foreign], low);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::UnknownHandle)
        ));

        // Antecedent bound to a variable the builder's table does not know
        let mut builder = Rulebase::builder(Variables::new());

        builder.antecedent("Stray", MembershipFunction::triangular(0., 0., 5.).unwrap(), x);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::UnknownHandle)
        ));
    }

    #[test]
    fn test_outputs_are_defuzzified_separately() {
        let mut vars = Variables::new();
        let x = vars.input("x", 0. ..=20.).unwrap();
        let near = vars.output("near", 0. ..=10.).unwrap();
        let far = vars.output("far", 0. ..=100.).unwrap();
        let mut builder = Rulebase::builder_with_capacity(vars, 2);
        let x_ten = builder.antecedent("XTen", MembershipFunction::triangular(0., 10., 20.).unwrap(), x);
        let four = builder.consequent("Four", MembershipFunction::triangular(2., 4., 6.).unwrap(), near);
        let fifty = builder.consequent("Fifty", MembershipFunction::triangular(0., 50., 100.).unwrap(), far);

        builder.rule([x_ten], four).rule([x_ten], fifty);

        let rulebase = builder.build(InferenceConfig::default()).unwrap();
        let inputs = Inputs::new().with(x, 10.);
        let height = rulebase.evaluate(&inputs, Defuzzification::Height).unwrap();

        assert_eq!(height.len(), 2);
        assert_eq!(height.get(near), Some(4.));
        assert_eq!(height.get(far), Some(50.));

        let centroid = rulebase.evaluate(&inputs, Defuzzification::Centroid).unwrap();

        assert_eq!(centroid.len(), 2);
        assert!((centroid.get(near).unwrap() - 4.).abs() < 1e-2);
        assert!((centroid.get(far).unwrap() - 50.).abs() < 1e-6);
    }

    struct Other {
        builder: Builder,
        b: Variable<Input>,
        out: Variable<Output>,
        b_low: AntecedentKey,
        low: ConsequentKey,
    }

    fn other_system() -> Other {
        let mut vars = Variables::new();
        let b = vars.input("b", 0. ..=10.).unwrap();
        let out = vars.output("out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder(vars);
        let b_low = builder.antecedent("BLow", MembershipFunction::triangular(0., 0., 5.).unwrap(), b);
        let low = builder.consequent("Low", MembershipFunction::triangular(0., 0., 5.).unwrap(), out);

        Other {
            builder,
            b,
            out,
            b_low,
            low,
        }
    }

    #[test]
    fn test_colliding_handles_from_another_builder() {
        let mut vars = Variables::new();
        let a = vars.input("a", 0. ..=10.).unwrap();
        let a_out = vars.output("a_out", 0. ..=10.).unwrap();
        let mut builder = Rulebase::builder(vars);
        let a_low = builder.antecedent("ALow", MembershipFunction::triangular(0., 0., 5.).unwrap(), a);
        let a_high = builder.consequent("AHigh", MembershipFunction::triangular(5., 10., 10.).unwrap(), a_out);

        // Every handle occupies the same slot as its counterpart in the other system
        let Other {
            mut builder, b, b_low, ..
        } = other_system();

        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
        assert_ne!(a_low, b_low);

        builder.rule([a_low], a_high);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::UnknownHandle)
        ));

        let Other { mut builder, low, .. } = other_system();

        builder.rule([a_low], low);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::UnknownHandle)
        ));

        let Other {
            mut builder, b_low, ..
        } = other_system();

        builder.rule([b_low], a_high);

        assert!(matches!(
            builder.build(InferenceConfig::default()),
            Err(FuzzyError::UnknownHandle)
        ));

        let Other {
            mut builder,
            b,
            out,
            b_low,
            low,
        } = other_system();

        builder.rule([b_low], low);

        let rulebase = builder.build(InferenceConfig::default()).unwrap();

        assert!(rulebase.antecedent(a_low).is_none());
        assert!(rulebase.consequent(a_high).is_none());
        assert_eq!(rulebase.antecedent(b_low).map(Antecedent::label), Some("BLow"));
        assert_eq!(
            rulebase.evaluate(&Inputs::new().with(a, 3.), Defuzzification::Height),
            Err(FuzzyError::UnknownHandle)
        );

        let outputs = rulebase
            .evaluate(&Inputs::new().with(b, 3.), Defuzzification::Height)
            .unwrap();

        assert_eq!(outputs.get(out), Some(0.));
        assert_eq!(outputs.get(a_out), None);
    }
}

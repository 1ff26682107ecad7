use std::collections::HashMap;

use crate::error::{FuzzyError, Result};
use crate::variable::{Input, Kind, Variable, Variables};

/// Crisp values for the input variables of one evaluation request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub(crate) HashMap<Variable<Input>, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add(&mut self, var: Variable<Input>, val: f64) {
        self.0.insert(var, val);
    }

    pub fn with(mut self, var: Variable<Input>, val: f64) -> Self {
        self.add(var, val);
        self
    }

    pub fn get(&self, var: Variable<Input>) -> Option<f64> {
        self.0.get(&var).copied()
    }

    /// Fails when any value was supplied for a variable of another table.
    pub(crate) fn ensure_table(&self, vars: &Variables) -> Result<()> {
        if self.0.keys().any(|var| var.1 != vars.table()) {
            tracing::debug!("input supplied for a variable of another system");

            return Err(FuzzyError::UnknownHandle);
        }

        Ok(())
    }

    /// The value supplied for `var`, checked against the variable's domain.
    pub(crate) fn crisp(&self, vars: &Variables, var: Variable<Input>) -> Result<f64> {
        let constraints = vars.get(var, Kind::Input)?;
        let value = *self
            .0
            .get(&var)
            .ok_or_else(|| FuzzyError::MissingInput(constraints.name.clone()))?;

        if !constraints.domain.contains(value) {
            tracing::debug!(variable = %constraints.name, value, "input lies outside its domain");

            return Err(FuzzyError::Domain {
                variable: constraints.name.clone(),
                value,
                lower: constraints.domain.lower(),
                upper: constraints.domain.upper(),
            });
        }

        Ok(value)
    }
}

#[test]
fn test_crisp_inputs() {
    let mut vars = Variables::new();
    let recency = vars.input("Recency", 0. ..=10.).unwrap();
    let reads = vars.input("Reads", 0. ..=10.).unwrap();
    let inputs = Inputs::new().with(recency, 7.);

    assert_eq!(inputs.get(recency), Some(7.));
    assert_eq!(inputs.crisp(&vars, recency), Ok(7.));
    assert_eq!(inputs.crisp(&vars, reads), Err(FuzzyError::MissingInput("Reads".into())));

    let inputs = inputs.with(recency, 10.5);

    assert_eq!(
        inputs.crisp(&vars, recency),
        Err(FuzzyError::Domain {
            variable: "Recency".into(),
            value: 10.5,
            lower: 0.,
            upper: 10.,
        })
    );
    assert!(Inputs::new().with(recency, f64::NAN).crisp(&vars, recency).is_err());
}

#[test]
fn test_inputs_from_another_table() {
    let mut vars = Variables::new();
    let mut other = Variables::new();
    let recency = vars.input("Recency", 0. ..=10.).unwrap();
    let foreign = other.input("Recency", 0. ..=10.).unwrap();
    let inputs = Inputs::new().with(foreign, 3.);

    assert_eq!(inputs.get(recency), None);
    assert_eq!(inputs.ensure_table(&vars), Err(FuzzyError::UnknownHandle));
    assert_eq!(inputs.ensure_table(&other), Ok(()));
    assert_eq!(inputs.crisp(&vars, recency), Err(FuzzyError::MissingInput("Recency".into())));
    assert_eq!(inputs.crisp(&vars, foreign), Err(FuzzyError::UnknownHandle));
}

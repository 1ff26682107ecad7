use std::collections::HashMap;

use crate::it2::CentroidInterval;
use crate::variable::{Output, Variable};

/// Crisp results of one evaluation, one per output variable with rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outputs {
    defuzzified: HashMap<Variable<Output>, f64>,
    type_reduced: HashMap<Variable<Output>, CentroidInterval>,
}

impl Outputs {
    pub(crate) fn new(defuzzified: HashMap<Variable<Output>, f64>) -> Self {
        Self {
            defuzzified,
            type_reduced: HashMap::new(),
        }
    }

    pub(crate) fn from_type_reduced(type_reduced: HashMap<Variable<Output>, CentroidInterval>) -> Self {
        let defuzzified = type_reduced
            .iter()
            .map(|(key, interval)| (*key, interval.midpoint()))
            .collect();

        Self {
            defuzzified,
            type_reduced,
        }
    }

    pub fn get(&self, var: Variable<Output>) -> Option<f64> {
        self.defuzzified.get(&var).copied()
    }

    /// The `[y_l, y_r]` interval an interval type-2 output was reduced to.
    /// Always `None` for type-1 outputs.
    pub fn interval(&self, var: Variable<Output>) -> Option<CentroidInterval> {
        self.type_reduced.get(&var).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable<Output>, f64)> + '_ {
        self.defuzzified.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.defuzzified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defuzzified.is_empty()
    }
}

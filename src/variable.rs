use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;

/// Number of samples taken over a domain unless configured otherwise.
pub const DEFAULT_DISCRETISATION: usize = 100;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

static TABLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies the [`Variables`] table a handle was issued by. A builder owns
/// its table, so this also tells the terms of two systems apart.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct TableId(u64);

impl TableId {
    fn next() -> Self {
        TableId(TABLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Marker for variables that receive crisp values from the caller.
#[derive(Clone, Copy, Debug)]
pub struct Input;

/// Marker for variables produced by defuzzification.
#[derive(Clone, Copy, Debug)]
pub struct Output;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Kind {
    Input,
    Output,
}

/// A typed handle to a variable; `K` is [`Input`] or [`Output`]. Only the
/// table that issued it accepts it.
pub struct Variable<K>(pub(crate) VariableKey, pub(crate) TableId, PhantomData<K>);

impl<K> Variable<K> {
    pub fn key(self) -> VariableKey {
        self.0
    }
}

impl<K> Clone for Variable<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Variable<K> {}

impl<K> PartialEq for Variable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl<K> Eq for Variable<K> {}

impl<K> Hash for Variable<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

impl<K> fmt::Debug for Variable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0).field(&self.1).finish()
    }
}

/// A closed interval `[lower, upper]` of finite reals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    lower: f64,
    upper: f64,
}

impl Domain {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Ok(Self { lower, upper })
        } else {
            Err(FuzzyError::InvalidDomain { lower, upper })
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn size(&self) -> f64 {
        self.upper - self.lower
    }

    /// NaN is never contained.
    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }

    /// `n` evenly spaced points, both bounds included.
    pub(crate) fn samples(&self, n: usize) -> Linspace {
        Linspace::new(self.lower, self.upper, n)
    }
}

impl TryFrom<RangeInclusive<f64>> for Domain {
    type Error = FuzzyError;

    fn try_from(range: RangeInclusive<f64>) -> Result<Self> {
        Self::new(*range.start(), *range.end())
    }
}

pub(crate) struct VariableContraints {
    pub(crate) name: String,
    pub(crate) domain: Domain,
    pub(crate) discretisation: usize,
    pub(crate) kind: Kind,
}

impl VariableContraints {
    /// The sampled universe of discourse.
    pub(crate) fn universe(&self) -> Linspace {
        self.domain.samples(self.discretisation)
    }
}

/// The table of every input and output variable of a system. Names are unique.
pub struct Variables {
    table: TableId,
    slots: SlotMap<VariableKey, VariableContraints>,
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl Variables {
    pub fn new() -> Self {
        Self {
            table: TableId::next(),
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn table(&self) -> TableId {
        self.table
    }

    pub fn input(&mut self, name: impl Into<String>, universe_range: RangeInclusive<f64>) -> Result<Variable<Input>> {
        let key = self.insert(name.into(), universe_range, Kind::Input)?;

        Ok(Variable(key, self.table, PhantomData))
    }

    /// Outputs are sampled at [`DEFAULT_DISCRETISATION`] points unless
    /// [`Variables::set_discretisation`] says otherwise.
    pub fn output(&mut self, name: impl Into<String>, universe_range: RangeInclusive<f64>) -> Result<Variable<Output>> {
        let key = self.insert(name.into(), universe_range, Kind::Output)?;

        Ok(Variable(key, self.table, PhantomData))
    }

    fn insert(&mut self, name: String, universe_range: RangeInclusive<f64>, kind: Kind) -> Result<VariableKey> {
        let domain = Domain::try_from(universe_range)?;

        if self.slots.values().any(|var| var.name == name) {
            return Err(FuzzyError::DuplicateVariable(name));
        }

        Ok(self.slots.insert(VariableContraints {
            name,
            domain,
            discretisation: DEFAULT_DISCRETISATION,
            kind,
        }))
    }

    pub fn set_discretisation<K>(&mut self, var: Variable<K>, level: usize) -> Result<()> {
        if level < 2 {
            return Err(FuzzyError::InvalidDiscretisation(level));
        }

        if var.1 != self.table {
            return Err(FuzzyError::UnknownHandle);
        }

        let var = self.slots.get_mut(var.0).ok_or(FuzzyError::UnknownHandle)?;

        var.discretisation = level;

        Ok(())
    }

    fn lookup<K>(&self, var: Variable<K>) -> Option<&VariableContraints> {
        if var.1 == self.table {
            self.slots.get(var.0)
        } else {
            None
        }
    }

    pub fn name<K>(&self, var: Variable<K>) -> Option<&str> {
        self.lookup(var).map(|var| var.name.as_str())
    }

    pub fn domain<K>(&self, var: Variable<K>) -> Option<Domain> {
        self.lookup(var).map(|var| var.domain)
    }

    pub fn discretisation<K>(&self, var: Variable<K>) -> Option<usize> {
        self.lookup(var).map(|var| var.discretisation)
    }

    pub fn input_named(&self, name: &str) -> Option<Variable<Input>> {
        self.find(name, Kind::Input).map(|key| Variable(key, self.table, PhantomData))
    }

    pub fn output_named(&self, name: &str) -> Option<Variable<Output>> {
        self.find(name, Kind::Output).map(|key| Variable(key, self.table, PhantomData))
    }

    fn find(&self, name: &str, kind: Kind) -> Option<VariableKey> {
        self.slots
            .iter()
            .find(|(_, var)| var.kind == kind && var.name == name)
            .map(|(key, _)| key)
    }

    /// Resolves a handle issued by this table for a variable of `kind`.
    pub(crate) fn get<K>(&self, var: Variable<K>, kind: Kind) -> Result<&VariableContraints> {
        self.lookup(var)
            .filter(|var| var.kind == kind)
            .ok_or(FuzzyError::UnknownHandle)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[test]
fn test_variables() {
    let mut vars = Variables::new();
    let recency = vars.input("Recency", 0. ..=10.).unwrap();
    let promotion = vars.output("Promotion", 0. ..=10.).unwrap();

    assert_eq!(vars.len(), 2);
    assert_eq!(vars.name(recency), Some("Recency"));
    assert_eq!(vars.domain(promotion), Some(Domain::new(0., 10.).unwrap()));
    assert_eq!(vars.discretisation(promotion), Some(DEFAULT_DISCRETISATION));
    assert_eq!(vars.input_named("Recency"), Some(recency));
    assert_eq!(vars.output_named("Promotion"), Some(promotion));
    assert_eq!(vars.output_named("Recency"), None);

    vars.set_discretisation(promotion, 50).unwrap();

    assert_eq!(vars.discretisation(promotion), Some(50));
    assert_eq!(vars.get(promotion, Kind::Output).unwrap().universe().len(), 50);
}

#[test]
fn test_handles_from_another_table() {
    let mut vars = Variables::new();
    let mut other = Variables::new();
    let recency = vars.input("Recency", 0. ..=10.).unwrap();
    let foreign = other.input("Foreign", 0. ..=1.).unwrap();

    // Both tables hand out the same first slot
    assert_eq!(recency.key(), foreign.key());
    assert_ne!(recency, foreign);
    assert_eq!(vars.name(foreign), None);
    assert_eq!(vars.domain(foreign), None);
    assert!(matches!(vars.get(foreign, Kind::Input), Err(FuzzyError::UnknownHandle)));
    assert_eq!(vars.set_discretisation(foreign, 10), Err(FuzzyError::UnknownHandle));
    assert_eq!(other.discretisation(foreign), Some(DEFAULT_DISCRETISATION));
}

#[test]
fn test_variables_reject_bad_configuration() {
    let mut vars = Variables::new();
    let recency = vars.input("Recency", 0. ..=10.).unwrap();

    assert_eq!(
        vars.input("Recency", 0. ..=1.),
        Err(FuzzyError::DuplicateVariable("Recency".into()))
    );
    assert_eq!(
        vars.output("Backwards", 10. ..=0.),
        Err(FuzzyError::InvalidDomain { lower: 10., upper: 0. })
    );
    assert!(vars.input("Unbounded", 0. ..=f64::INFINITY).is_err());
    assert_eq!(
        vars.set_discretisation(recency, 1),
        Err(FuzzyError::InvalidDiscretisation(1))
    );
}

#[test]
fn test_domain() {
    let domain = Domain::new(0., 10.).unwrap();

    assert!(domain.contains(0.));
    assert!(domain.contains(10.));
    assert!(!domain.contains(10.5));
    assert!(!domain.contains(f64::NAN));
    assert_eq!(domain.size(), 10.);
    assert_eq!(domain.samples(3).collect::<Vec<_>>(), vec![0., 5., 10.]);
}

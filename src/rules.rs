/// An ordered rule table. Rules refer to shared antecedents and consequents
/// by key, so one linguistic term can appear in any number of rules.
#[derive(Clone, Debug)]
pub struct Rules<A, C>(pub(crate) Vec<Rule<A, C>>);

impl<A: Copy, C: Copy> Rules<A, C> {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, antecedents: impl IntoIterator<Item = A>, consequent: C) {
        self.0.push(Rule {
            antecedents: antecedents.into_iter().collect(),
            consequent,
        });
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Rule<A, C>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A: Copy, C: Copy> Default for Rules<A, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// IF every antecedent holds THEN the consequent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rule<A, C> {
    pub(crate) antecedents: Vec<A>,
    pub(crate) consequent: C,
}

impl<A: Copy, C: Copy> Rule<A, C> {
    pub fn antecedents(&self) -> &[A] {
        &self.antecedents
    }

    pub fn consequent(&self) -> C {
        self.consequent
    }
}

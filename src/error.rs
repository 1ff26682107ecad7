use thiserror::Error;

/// Everything that can go wrong while configuring or evaluating a fuzzy system.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FuzzyError {
    /// A crisp input lies outside the domain of its variable (or is not a number).
    #[error("value {value} for `{variable}` lies outside its domain [{lower}, {upper}]")]
    Domain {
        variable: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// Every rule concluding on this output fired with zero strength.
    #[error("no rule fired for output `{variable}`, defuzzification is undefined")]
    UndefinedDefuzzification { variable: String },

    /// Shape parameters are unordered or out of range, or an interval set's
    /// lower membership rises above its upper membership.
    #[error("malformed membership function: {0}")]
    MalformedMembershipFunction(String),

    #[error("invalid domain [{lower}, {upper}]")]
    InvalidDomain { lower: f64, upper: f64 },

    #[error("variable `{0}` is defined twice")]
    DuplicateVariable(String),

    #[error("discretisation level {0} is below the minimum of 2 samples")]
    InvalidDiscretisation(usize),

    #[error("no value supplied for input `{0}`")]
    MissingInput(String),

    /// A variable, antecedent or consequent handle that was not created by this system.
    #[error("handle does not belong to this system")]
    UnknownHandle,

    #[error("rule {index} has no antecedents")]
    EmptyRule { index: usize },

    #[error("unknown defuzzification mode {0}")]
    UnknownMode(u8),
}

pub type Result<T, E = FuzzyError> = std::result::Result<T, E>;

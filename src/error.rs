use thiserror::Error;

/// Everything that can go wrong while turning an expression into a selection.
///
/// All variants are recoverable by the user: evaluation stops at the first
/// failure, the live selection store is left untouched, and the message
/// explains what to fix. Nothing here ever aborts the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Calling {function}: the feature '{key}' is unknown to the feature store.")]
    UnknownFeature { function: String, key: String },

    #[error("Calling {function}: the feature '{feature}' is not defined for {target}.")]
    WrongFeatureTarget {
        function: String,
        feature: String,
        target: &'static str,
    },

    #[error("Calling {function}: the projection key '{key}' is unknown to the feature '{feature}'.")]
    UnknownProjection {
        function: String,
        feature: String,
        key: String,
    },

    #[error("The tag-set '{0}' is unknown to the tag-set store.")]
    UnknownTagSet(String),

    #[error("The tag '{label}' is unknown to the tag-set '{tag_set}'.")]
    UnknownTag { label: String, tag_set: String },

    #[error("Calling morph: unknown morphing '{0}'.")]
    UnknownMorph(String),

    #[error("Unknown function name: {0}.")]
    UnknownFunction(String),

    #[error("Cannot apply the '{op}' operator to {lhs} and {rhs}.{hint}")]
    BinaryType {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
        hint: &'static str,
    },

    #[error("Cannot apply the '{op}' operator to {operand}.")]
    UnaryType {
        op: &'static str,
        operand: &'static str,
    },

    #[error(
        "The name '{0}' is ambiguous here. Specify it between single quotation marks \
         (e.g. 'JY', 'toVertex')."
    )]
    UnquotedName(String),

    #[error("Incorrect syntax for {function}: {hint}")]
    BadCall {
        function: &'static str,
        hint: &'static str,
    },

    #[error("Got unexpected result: {0}.")]
    UnexpectedResult(String),
}

pub type Result<T> = std::result::Result<T, SelectError>;

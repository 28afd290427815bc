//! Error types for the resolver.

/// Errors from parsing an alias rule.
///
/// These are recoverable: the offending line is reported and skipped,
/// the rest of the file still loads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    /// The line doesn't start with the `alias` keyword.
    #[error("expected `alias`, found `{0}`")]
    MissingKeyword(String),

    /// A rule needs exactly a `from` and a `to` token.
    #[error("expected 2 tokens after `alias`, found {0}")]
    WrongArity(usize),

    /// The `from` token is not `*`, an index, or a lowercase name.
    #[error("invalid rule pattern `{0}`")]
    InvalidPattern(String),

    /// The `to` token can't be turned into an address.
    #[error("invalid rule target `{0}`")]
    InvalidTarget(String),
}

/// Errors from resolving a device identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing to resolve. Every non-empty token yields some address.
    #[error("empty device identifier")]
    EmptyIdentifier,
}

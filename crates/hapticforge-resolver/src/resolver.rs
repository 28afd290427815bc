//! The resolver: applies an ordered rule list to a device token.

use crate::{DeviceRule, ResolveError, Resolution};

/// Resolves user-typed device tokens through an ordered list of alias
/// rules.
///
/// The rule list is fixed at construction. Resolution is a pure
/// function of the rules and the token:
///
/// 1. Every rule is tried against the token.
/// 2. Exactly one match → its target.
/// 3. No match → the token itself is parsed as an address
///    ([`Resolution::parse`]).
/// 4. Several matches → wildcard rules are dropped and the rest retried.
///    If exactly one specific rule remains, it wins. Otherwise the
///    ambiguity is logged and the first match in rule order is used.
///
/// Ambiguity is never an error: a command always goes somewhere.
#[derive(Debug, Clone, Default)]
pub struct DeviceResolver {
    rules: Vec<DeviceRule>,
}

impl DeviceResolver {
    pub fn new(rules: Vec<DeviceRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DeviceRule] {
        &self.rules
    }

    /// Resolves `token` to a device address.
    ///
    /// # Errors
    /// Returns [`ResolveError::EmptyIdentifier`] for an empty token
    /// that no rule claims. Every other token resolves.
    pub fn resolve(&self, token: &str) -> Result<Resolution, ResolveError> {
        let matches: Vec<&Resolution> =
            self.rules.iter().filter_map(|rule| rule.apply(token)).collect();

        match matches.as_slice() {
            [] => Resolution::parse(token).ok_or(ResolveError::EmptyIdentifier),
            [only] => Ok((*only).clone()),
            [first, ..] => {
                let narrowed: Vec<&Resolution> = self
                    .rules
                    .iter()
                    .filter(|rule| !rule.pattern.is_wildcard())
                    .filter_map(|rule| rule.apply(token))
                    .collect();

                if let [only] = narrowed.as_slice() {
                    return Ok((*only).clone());
                }

                tracing::warn!(
                    token,
                    candidates = matches.len(),
                    chosen = %first,
                    "ambiguous device name matches multiple rules, using first match"
                );
                Ok((*first).clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use hapticforge_protocol::DeviceIndex;

    use super::*;
    use crate::RuleName;

    fn rule(from: &str, to: &str) -> DeviceRule {
        format!("{from} {to}").parse().expect("valid test rule")
    }

    #[test]
    fn test_resolve_with_no_rules_parses_token() {
        let resolver = DeviceResolver::default();

        assert_eq!(
            resolver.resolve("3"),
            Ok(Resolution::Index(DeviceIndex(3)))
        );
        assert_eq!(
            resolver.resolve("abc"),
            Ok(Resolution::Name("abc".into()))
        );
        assert_eq!(resolver.resolve("@1"), Ok(Resolution::First));
    }

    #[test]
    fn test_resolve_empty_token_fails() {
        let resolver = DeviceResolver::default();
        assert_eq!(resolver.resolve(""), Err(ResolveError::EmptyIdentifier));
    }

    #[test]
    fn test_resolve_empty_token_claimed_by_wildcard() {
        let resolver = DeviceResolver::new(vec![rule("*", "@1")]);
        assert_eq!(resolver.resolve(""), Ok(Resolution::First));
    }

    #[test]
    fn test_resolve_single_match_returns_its_target() {
        let resolver = DeviceResolver::new(vec![rule("hush", "4")]);
        assert_eq!(
            resolver.resolve("hush"),
            Ok(Resolution::Index(DeviceIndex(4)))
        );
    }

    #[test]
    fn test_resolve_unmatched_token_falls_through() {
        let resolver = DeviceResolver::new(vec![rule("hush", "4")]);
        assert_eq!(
            resolver.resolve("edge"),
            Ok(Resolution::Name("edge".into()))
        );
    }

    #[test]
    fn test_resolve_specific_rule_beats_wildcard() {
        let resolver =
            DeviceResolver::new(vec![rule("*", "@1"), rule("dev", "1")]);
        assert_eq!(
            resolver.resolve("dev"),
            Ok(Resolution::Index(DeviceIndex(1)))
        );
        // Only the wildcard matches anything else.
        assert_eq!(resolver.resolve("other"), Ok(Resolution::First));
    }

    #[test]
    fn test_resolve_ambiguous_uses_first_match_in_rule_order() {
        // Both the wildcard and two specific rules match "dev"; the
        // specific ones don't narrow to one, so the very first match wins.
        let resolver = DeviceResolver::new(vec![
            rule("*", "@1"),
            rule("dev", "1"),
            rule("dev", "2"),
        ]);
        assert_eq!(resolver.resolve("dev"), Ok(Resolution::First));
    }

    #[test]
    fn test_resolve_ambiguous_specific_rules_without_wildcard() {
        let resolver = DeviceResolver::new(vec![
            DeviceRule::new(RuleName::Index(5), Resolution::Name("edge".into())),
            rule("5", "hush"),
        ]);
        assert_eq!(
            resolver.resolve("5"),
            Ok(Resolution::Name("edge".into()))
        );
    }
}

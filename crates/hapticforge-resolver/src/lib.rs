//! Device identifier resolution for Hapticforge.
//!
//! Users address devices with short tokens: a server index (`3`), a
//! name (`hush`), or the first-match sentinel (`@1`). Alias rules loaded
//! from a file let a token stand for a different address:
//!
//! ```text
//! alias *      @1     # anything unknown → whichever device shows up first
//! alias hush   0      # "hush" → device index 0
//! alias 7      edge   # "7" → the device named "edge"
//! ```
//!
//! # Key types
//!
//! - [`RuleName`]: the left-hand side of a rule (wildcard, name, index)
//! - [`Resolution`]: the address a token resolves to
//! - [`DeviceRule`]: one `from → to` pair
//! - [`DeviceResolver`]: applies an ordered rule list to a token
//! - [`parse_alias_file`]: reads `alias <from> <to>` lines
//!
//! Resolution never looks at connected devices. Matching a
//! [`Resolution`] against a live device is the session's job, via
//! [`Resolution::matches`].

mod error;
mod resolver;
mod rule;

pub use error::{ResolveError, RuleParseError};
pub use resolver::DeviceResolver;
pub use rule::{
    AliasFile, DeviceRule, FIRST_MATCH, RejectedLine, Resolution, RuleName,
    parse_alias_file,
};

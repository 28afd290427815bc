//! Rule types and the alias-file format.

use std::fmt;
use std::str::FromStr;

use hapticforge_protocol::DeviceIndex;

use crate::RuleParseError;

/// The literal token that means "whichever connected device matches".
pub const FIRST_MATCH: &str = "@1";

// ---------------------------------------------------------------------------
// RuleName: left-hand side of a rule
// ---------------------------------------------------------------------------

/// What a rule matches against the user's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleName {
    /// `*`: matches every token.
    Any,
    /// A lowercase name; matches the token exactly.
    Name(String),
    /// A number; matches a token that parses to the same number.
    Index(u32),
}

impl RuleName {
    /// Returns `true` if this pattern accepts `token`.
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Name(name) => name == token,
            Self::Index(index) => token.parse::<u32>().is_ok_and(|n| n == *index),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl FromStr for RuleName {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            Ok(Self::Any)
        } else if let Ok(index) = s.parse::<u32>() {
            Ok(Self::Index(index))
        } else if is_rule_name(s) {
            Ok(Self::Name(s.to_string()))
        } else {
            Err(RuleParseError::InvalidPattern(s.to_string()))
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// `[_a-z][_a-z-]*`
fn is_rule_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '-' || c.is_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Resolution: a device address
// ---------------------------------------------------------------------------

/// The address a device token resolves to.
///
/// An address is not a device: it is re-matched against every device
/// the server announces, so a command can wait for a device that
/// hasn't connected yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Whichever connected device comes first.
    First,
    /// The device with this server-assigned index.
    Index(DeviceIndex),
    /// The device whose name is exactly this string.
    Name(String),
}

impl Resolution {
    /// Parses a raw token as an address.
    ///
    /// `@1` is the first-match sentinel, a number is an index, and
    /// anything else is taken as a device name. Only the empty string
    /// has no address.
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            None
        } else if token == FIRST_MATCH {
            Some(Self::First)
        } else if let Ok(index) = token.parse::<u32>() {
            Some(Self::Index(DeviceIndex(index)))
        } else {
            Some(Self::Name(token.to_string()))
        }
    }

    /// Returns `true` if the device with this index and name is
    /// addressed by `self`.
    pub fn matches(&self, index: DeviceIndex, name: &str) -> bool {
        match self {
            Self::First => true,
            Self::Index(wanted) => *wanted == index,
            Self::Name(wanted) => wanted == name,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "{FIRST_MATCH}"),
            Self::Index(index) => write!(f, "{}", index.0),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// DeviceRule
// ---------------------------------------------------------------------------

/// One alias: tokens accepted by `pattern` resolve to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRule {
    pub pattern: RuleName,
    pub target: Resolution,
}

impl DeviceRule {
    pub fn new(pattern: RuleName, target: Resolution) -> Self {
        Self { pattern, target }
    }

    /// Returns the target if this rule accepts `token`.
    pub fn apply(&self, token: &str) -> Option<&Resolution> {
        self.pattern.accepts(token).then_some(&self.target)
    }
}

/// Parses `"<from> <to>"` (the part after the `alias` keyword).
impl FromStr for DeviceRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [from, to] = tokens[..] else {
            return Err(RuleParseError::WrongArity(tokens.len()));
        };

        let pattern = from.parse()?;
        let target = Resolution::parse(to)
            .ok_or_else(|| RuleParseError::InvalidTarget(to.to_string()))?;

        Ok(Self { pattern, target })
    }
}

impl fmt::Display for DeviceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alias {} {}", self.pattern, self.target)
    }
}

// ---------------------------------------------------------------------------
// Alias file
// ---------------------------------------------------------------------------

/// A line of an alias file that didn't parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number.
    pub line: usize,
    pub error: RuleParseError,
}

/// The result of reading an alias file: the rules in file order, plus
/// every line that was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasFile {
    pub rules: Vec<DeviceRule>,
    pub rejected: Vec<RejectedLine>,
}

/// Parses an alias file, one `alias <from> <to>` rule per line.
///
/// Blank lines and lines starting with `#` are skipped. A trailing
/// `# comment` after a rule is allowed. Malformed lines are logged and
/// collected in [`AliasFile::rejected`]; they never abort the load.
pub fn parse_alias_file(text: &str) -> AliasFile {
    let mut file = AliasFile::default();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        match parse_alias_line(line) {
            Ok(rule) => file.rules.push(rule),
            Err(error) => {
                tracing::warn!(line = number + 1, %error, "skipping alias rule");
                file.rejected.push(RejectedLine {
                    line: number + 1,
                    error,
                });
            }
        }
    }

    file
}

fn parse_alias_line(line: &str) -> Result<DeviceRule, RuleParseError> {
    let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if keyword != "alias" {
        return Err(RuleParseError::MissingKeyword(keyword.to_string()));
    }
    rest.parse()
}

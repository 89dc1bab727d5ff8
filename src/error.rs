/*!
error module defines the error types used in bgplg-core.
*/
use thiserror::Error;

/// Configuration validation failures.
///
/// Classification config (community trees, RPKI/blackhole pattern lists) is
/// validated when it is loaded. The runtime lookup functions assume validated
/// input and never produce these errors themselves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A pattern must carry 2 or 3 comparable fields (excluding the optional
    /// trailing range marker).
    #[error("pattern has {0} comparable fields, expected 2 or 3")]
    PatternArity(usize),
    /// The `"*"` token is only meaningful as the trailing range marker.
    #[error("'*' is only valid as a trailing range marker")]
    MisplacedWildcard,
    /// An open-ended pattern needs a numeric final field to act as the bound.
    #[error("open-ended range requires a numeric bound")]
    NonNumericBound,
    /// A literal type tag (e.g. `"ro"`) may only appear as the first field.
    #[error("type tag only allowed as the first pattern field, found at {0}")]
    TagPosition(usize),
}

/// Errors from parsing the textual (colon-joined) community forms used in
/// URL query parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommunityParseError {
    #[error("empty community string")]
    Empty,
    #[error("invalid community field '{0}'")]
    InvalidField(String),
    #[error("community has {0} fields, expected 2 or 3")]
    FieldCount(usize),
    #[error("extended community has {0} value fields, expected 1 or 2")]
    ExtendedFieldCount(usize),
    #[error("extended community must start with a non-numeric type tag")]
    MissingTag,
}

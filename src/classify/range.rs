//! Pattern-based community classification.
//!
//! RPKI status and blackhole membership are signalled by well-known
//! communities. The backend configures them as small positional patterns,
//! e.g. `[1234, 1000, 1]` (exact) or `[1234, 1000, 10, "*"]` (the third
//! field is a lower bound). Pattern shape is validated at load time; the
//! match functions assume validated patterns and never fail.

use crate::error::ConfigError;
use crate::models::{BgpAttributes, CommunityField, MetaCommunity};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::net::IpAddr;

/// One comparable pattern field: a numeric literal or a literal type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternField {
    Num(u64),
    Tag(String),
}

/// A community pattern of 2-3 fields. When `open_ended` is set the final
/// (numeric) field is a lower bound instead of a literal: the community
/// matches if its final field is >= the bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    fields: SmallVec<[PatternField; 3]>,
    open_ended: bool,
}

/// A successful pattern match. `reason` carries the community's final field
/// value when it is numeric, used to select per-reason messages (e.g. a
/// specific invalid sub-code under an open-ended invalid pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub reason: Option<u64>,
}

impl Pattern {
    pub fn new(
        fields: impl IntoIterator<Item = PatternField>,
        open_ended: bool,
    ) -> Result<Pattern, ConfigError> {
        let fields: SmallVec<[PatternField; 3]> = fields.into_iter().collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(ConfigError::PatternArity(fields.len()));
        }
        for (i, field) in fields.iter().enumerate() {
            match field {
                PatternField::Tag(tag) if tag.as_str() == super::tree::WILDCARD => {
                    return Err(ConfigError::MisplacedWildcard);
                }
                PatternField::Tag(_) if i > 0 => return Err(ConfigError::TagPosition(i)),
                _ => {}
            }
        }
        if open_ended && !matches!(fields.last(), Some(PatternField::Num(_))) {
            return Err(ConfigError::NonNumericBound);
        }
        Ok(Pattern {
            fields,
            open_ended,
        })
    }

    /// Field-by-field value comparison against the community. Numeric fields
    /// compare as integers, tags compare literally; arity must match
    /// exactly.
    pub fn matches(&self, community: &MetaCommunity) -> Option<PatternMatch> {
        let actual = community.fields();
        if actual.len() != self.fields.len() {
            return None;
        }
        let mut reason = None;
        for (i, (pattern, field)) in self.fields.iter().zip(actual.iter()).enumerate() {
            let last = i + 1 == self.fields.len();
            match (pattern, field) {
                (PatternField::Num(bound), CommunityField::Num(value)) => {
                    let ok = if last && self.open_ended {
                        value >= bound
                    } else {
                        value == bound
                    };
                    if !ok {
                        return None;
                    }
                    if last {
                        reason = Some(*value);
                    }
                }
                (PatternField::Tag(tag), CommunityField::Tag(actual_tag)) => {
                    if tag != actual_tag {
                        return None;
                    }
                }
                _ => return None,
            }
        }
        Some(PatternMatch { reason })
    }
}

///////////
// SERDE //
///////////

// Patterns are configured as JSON arrays like [1234, 1000, 10, "*"];
// deserialization funnels through Pattern::new so malformed shapes are
// rejected when the configuration is loaded, not at match time.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawToken {
    Num(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut tokens = Vec::<RawToken>::deserialize(deserializer)?;
        let open_ended =
            matches!(tokens.last(), Some(RawToken::Text(t)) if t.as_str() == super::tree::WILDCARD);
        if open_ended {
            tokens.pop();
        }
        let fields = tokens.into_iter().map(|token| match token {
            RawToken::Num(v) => PatternField::Num(v),
            RawToken::Text(t) => PatternField::Tag(t),
        });
        Pattern::new(fields, open_ended).map_err(D::Error::custom)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len() + usize::from(self.open_ended);
        let mut seq = serializer.serialize_seq(Some(len))?;
        for field in &self.fields {
            match field {
                PatternField::Num(v) => seq.serialize_element(v)?,
                PatternField::Tag(t) => seq.serialize_element(t)?,
            }
        }
        if self.open_ended {
            seq.serialize_element(super::tree::WILDCARD)?;
        }
        seq.end()
    }
}

//////////
// RPKI //
//////////

/// RPKI origin validation outcome, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpkiStatus {
    Valid,
    Unknown,
    NotChecked,
    Invalid,
}

/// A classified route: its RPKI status plus the matched community's final
/// field value when one was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpkiClassification {
    pub status: RpkiStatus,
    pub reason: Option<u64>,
}

/// Large-community patterns for each RPKI category, as delivered by backend
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpkiConfig {
    #[serde(default)]
    pub valid: Vec<Pattern>,
    #[serde(default)]
    pub unknown: Vec<Pattern>,
    #[serde(default)]
    pub not_checked: Vec<Pattern>,
    #[serde(default)]
    pub invalid: Vec<Pattern>,
}

impl RpkiConfig {
    /// The categories in their fixed evaluation order.
    fn categories(&self) -> [(RpkiStatus, &[Pattern]); 4] {
        [
            (RpkiStatus::Valid, &self.valid),
            (RpkiStatus::Unknown, &self.unknown),
            (RpkiStatus::NotChecked, &self.not_checked),
            (RpkiStatus::Invalid, &self.invalid),
        ]
    }

    /// Classifies a route by its large communities. Categories are tested
    /// in priority order (valid, unknown, not-checked, invalid) across all
    /// large communities; the first category with any match wins. Routes
    /// without large communities classify as `None`.
    pub fn classify(&self, bgp: &BgpAttributes) -> Option<RpkiClassification> {
        for (status, patterns) in self.categories() {
            for community in &bgp.large_communities {
                let community = MetaCommunity::Large(*community);
                for pattern in patterns {
                    if let Some(matched) = pattern.matches(&community) {
                        return Some(RpkiClassification {
                            status,
                            reason: matched.reason,
                        });
                    }
                }
            }
        }
        None
    }
}

///////////////
// BLACKHOLE //
///////////////

/// Blackhole detection config: well-known blackhole next-hop addresses plus
/// community patterns across all three community flavors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlackholeConfig {
    #[serde(default)]
    pub next_hops: Vec<IpAddr>,
    #[serde(default)]
    pub communities: Vec<Pattern>,
}

impl BlackholeConfig {
    /// A route is a blackhole if its next hop is a known blackhole address
    /// or any of its communities matches any configured pattern. Plain OR,
    /// no priority between the checks.
    pub fn is_blackhole(&self, bgp: &BgpAttributes) -> bool {
        if let Some(next_hop) = bgp.next_hop {
            if self.next_hops.contains(&next_hop) {
                return true;
            }
        }
        bgp.all_communities()
            .any(|community| self.communities.iter().any(|p| p.matches(&community).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Community, ExtendedCommunity, LargeCommunity};

    fn large(a: u32, b: u32, c: u32) -> MetaCommunity {
        MetaCommunity::Large(LargeCommunity::new(a, [b, c]))
    }

    #[test]
    fn test_pattern_exact_match() {
        let pattern: Pattern = serde_json::from_str("[1, 1, 1]").unwrap();
        let matched = pattern.matches(&large(1, 1, 1)).unwrap();
        assert_eq!(matched.reason, Some(1));
        assert!(pattern.matches(&large(1, 1, 2)).is_none());
        assert!(pattern
            .matches(&MetaCommunity::Plain(Community::new(1, 1)))
            .is_none());
    }

    #[test]
    fn test_pattern_open_range() {
        let pattern: Pattern = serde_json::from_str(r#"[1, 1, 10, "*"]"#).unwrap();
        assert_eq!(pattern.matches(&large(1, 1, 15)).unwrap().reason, Some(15));
        assert_eq!(pattern.matches(&large(1, 1, 10)).unwrap().reason, Some(10));
        assert!(pattern.matches(&large(1, 1, 9)).is_none());
        assert!(pattern.matches(&large(1, 2, 15)).is_none());
    }

    #[test]
    fn test_pattern_tag_match() {
        let pattern: Pattern = serde_json::from_str(r#"["ro", 6695, 666]"#).unwrap();
        let community = MetaCommunity::Extended(ExtendedCommunity::new("ro", [6695, 666]));
        assert!(pattern.matches(&community).is_some());

        let other = MetaCommunity::Extended(ExtendedCommunity::new("rt", [6695, 666]));
        assert!(pattern.matches(&other).is_none());
        // tag never matches a numeric field
        assert!(pattern.matches(&large(6695, 666, 0)).is_none());
    }

    #[test]
    fn test_pattern_config_errors() {
        assert!(matches!(
            serde_json::from_str::<Pattern>("[1]"),
            Err(e) if e.to_string().contains("expected 2 or 3")
        ));
        assert!(serde_json::from_str::<Pattern>("[1, 2, 3, 4, 5]").is_err());
        // wildcard in a non-trailing position
        assert!(serde_json::from_str::<Pattern>(r#"[1, "*", 3]"#).is_err());
        // open range over a tag
        assert!(serde_json::from_str::<Pattern>(r#"["ro", "*"]"#).is_err());
        // tag in a later position
        assert!(serde_json::from_str::<Pattern>(r#"[1, "ro", 3]"#).is_err());
    }

    #[test]
    fn test_pattern_serialize_round_trip() {
        for raw in ["[1,1,1]", r#"[1,1,10,"*"]"#, r#"["ro",6695,666]"#] {
            let pattern: Pattern = serde_json::from_str(raw).unwrap();
            let serialized = serde_json::to_string(&pattern).unwrap();
            let again: Pattern = serde_json::from_str(&serialized).unwrap();
            assert_eq!(pattern, again);
        }
    }

    fn rpki_config() -> RpkiConfig {
        serde_json::from_str(
            r#"{
                "valid": [[1, 1, 1]],
                "unknown": [[1, 1, 2]],
                "not_checked": [[1, 1, 3]],
                "invalid": [[1, 1, 10, "*"]]
            }"#,
        )
        .unwrap()
    }

    fn route_with_large(communities: &[(u32, u32, u32)]) -> BgpAttributes {
        BgpAttributes {
            large_communities: communities
                .iter()
                .map(|(a, b, c)| LargeCommunity::new(*a, [*b, *c]))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rpki_valid() {
        let classification = rpki_config()
            .classify(&route_with_large(&[(1, 1, 1)]))
            .unwrap();
        assert_eq!(classification.status, RpkiStatus::Valid);
    }

    #[test]
    fn test_rpki_invalid_with_reason() {
        let classification = rpki_config()
            .classify(&route_with_large(&[(1, 1, 15)]))
            .unwrap();
        assert_eq!(classification.status, RpkiStatus::Invalid);
        assert_eq!(classification.reason, Some(15));
    }

    #[test]
    fn test_rpki_priority_order() {
        // both valid and invalid patterns match; valid is tested first
        let classification = rpki_config()
            .classify(&route_with_large(&[(1, 1, 20), (1, 1, 1)]))
            .unwrap();
        assert_eq!(classification.status, RpkiStatus::Valid);
    }

    #[test]
    fn test_rpki_no_communities() {
        assert_eq!(rpki_config().classify(&BgpAttributes::default()), None);
    }

    fn blackhole_config() -> BlackholeConfig {
        serde_json::from_str(
            r#"{
                "next_hops": ["192.0.2.66"],
                "communities": [[65535, 666], [1234, 666, 0]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_blackhole_by_next_hop() {
        let bgp = BgpAttributes {
            next_hop: Some("192.0.2.66".parse().unwrap()),
            ..Default::default()
        };
        assert!(blackhole_config().is_blackhole(&bgp));
    }

    #[test]
    fn test_blackhole_by_community() {
        let bgp = BgpAttributes {
            next_hop: Some("198.51.100.1".parse().unwrap()),
            communities: vec![Community::new(65535, 666)],
            ..Default::default()
        };
        assert!(blackhole_config().is_blackhole(&bgp));

        let bgp = BgpAttributes {
            large_communities: vec![LargeCommunity::new(1234, [666, 0])],
            ..Default::default()
        };
        assert!(blackhole_config().is_blackhole(&bgp));
    }

    #[test]
    fn test_blackhole_no_match() {
        let bgp = BgpAttributes {
            next_hop: Some("198.51.100.1".parse().unwrap()),
            communities: vec![Community::new(65535, 1)],
            ..Default::default()
        };
        assert!(!blackhole_config().is_blackhole(&bgp));
        assert!(!blackhole_config().is_blackhole(&BgpAttributes::default()));
    }
}

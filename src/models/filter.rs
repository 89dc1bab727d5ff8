use crate::models::community::MetaCommunity;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// The five facet filter groups, in the fixed order they appear in payloads
/// and query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Sources,
    Asns,
    Communities,
    ExtCommunities,
    LargeCommunities,
}

impl GroupKey {
    pub const ALL: [GroupKey; 5] = [
        GroupKey::Sources,
        GroupKey::Asns,
        GroupKey::Communities,
        GroupKey::ExtCommunities,
        GroupKey::LargeCommunities,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Sources => "sources",
            GroupKey::Asns => "asns",
            GroupKey::Communities => "communities",
            GroupKey::ExtCommunities => "ext_communities",
            GroupKey::LargeCommunities => "large_communities",
        }
    }

    pub fn from_key(key: &str) -> Option<GroupKey> {
        GroupKey::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A filterable value: a route server id, a neighbor ASN, or a community.
///
/// The JSON form is whatever the backend sent for the facet: a string, a
/// number, or a positional community array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Asn(u64),
    Source(String),
    Community(MetaCommunity),
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Asn(v) => write!(f, "{}", v),
            FilterValue::Source(v) => write!(f, "{}", v),
            FilterValue::Community(v) => write!(f, "{}", v),
        }
    }
}

/// One facet: a value together with the number of routes matching it in the
/// originating result set. `name` is the backend-provided display name and is
/// empty for entries reconstructed from a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    #[serde(default)]
    pub name: String,
    pub value: FilterValue,
    #[serde(default = "default_cardinality")]
    pub cardinality: u64,
}

const fn default_cardinality() -> u64 {
    1
}

impl FilterEntry {
    pub fn new(value: FilterValue) -> FilterEntry {
        FilterEntry {
            name: String::new(),
            value,
            cardinality: 1,
        }
    }

    pub fn with_cardinality(value: FilterValue, cardinality: u64) -> FilterEntry {
        FilterEntry {
            name: String::new(),
            value,
            cardinality,
        }
    }
}

/// The ordered facet entries of one filter group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

impl FilterGroup {
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// All five filter groups. The groups are named struct fields, so "every
/// group is always present" holds by construction; an unused group is an
/// empty list, never an omission.
///
/// The JSON form is the backend's array of keyed groups:
/// `[{"key": "sources", "filters": [...]}, ...]`. Groups may arrive in any
/// order and may be missing; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub sources: FilterGroup,
    pub asns: FilterGroup,
    pub communities: FilterGroup,
    pub ext_communities: FilterGroup,
    pub large_communities: FilterGroup,
}

impl FilterState {
    pub fn group(&self, key: GroupKey) -> &FilterGroup {
        match key {
            GroupKey::Sources => &self.sources,
            GroupKey::Asns => &self.asns,
            GroupKey::Communities => &self.communities,
            GroupKey::ExtCommunities => &self.ext_communities,
            GroupKey::LargeCommunities => &self.large_communities,
        }
    }

    pub fn group_mut(&mut self, key: GroupKey) -> &mut FilterGroup {
        match key {
            GroupKey::Sources => &mut self.sources,
            GroupKey::Asns => &mut self.asns,
            GroupKey::Communities => &mut self.communities,
            GroupKey::ExtCommunities => &mut self.ext_communities,
            GroupKey::LargeCommunities => &mut self.large_communities,
        }
    }

    /// The groups in fixed key order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupKey, &FilterGroup)> {
        GroupKey::ALL.into_iter().map(move |key| (key, self.group(key)))
    }

    pub fn has_filters(&self) -> bool {
        self.groups().any(|(_, group)| group.has_filters())
    }
}

/// Structural equality of two filter states: per group, matching length and
/// per-index equal `value`. `name` and `cardinality` are display data and do
/// not participate; callers use this to suppress redundant re-fetches when
/// navigation changes something other than the filters.
pub fn filters_equal(a: &FilterState, b: &FilterState) -> bool {
    GroupKey::ALL.into_iter().all(|key| {
        let (ga, gb) = (a.group(key), b.group(key));
        ga.filters.len() == gb.filters.len()
            && ga
                .filters
                .iter()
                .zip(&gb.filters)
                .all(|(x, y)| x.value == y.value)
    })
}

/// One result set's view of the filters: `applied` constrained the request
/// that produced it, `available` carries the backend's facet counts over the
/// candidate set. Created fresh per API response, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSet {
    #[serde(default, rename = "filters_applied")]
    pub applied: FilterState,
    #[serde(default, rename = "filters_available")]
    pub available: FilterState,
}

///////////
// SERDE //
///////////

#[derive(Serialize)]
struct KeyedGroupRef<'a> {
    key: &'a str,
    filters: &'a [FilterEntry],
}

#[derive(Deserialize)]
struct KeyedGroup {
    key: String,
    #[serde(default)]
    filters: Vec<FilterEntry>,
}

impl Serialize for FilterState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(GroupKey::ALL.len()))?;
        for (key, group) in self.groups() {
            seq.serialize_element(&KeyedGroupRef {
                key: key.as_str(),
                filters: &group.filters,
            })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FilterState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut state = FilterState::default();
        for group in Vec::<KeyedGroup>::deserialize(deserializer)? {
            match GroupKey::from_key(&group.key) {
                Some(key) => {
                    let mut filters = group.filters;
                    if key == GroupKey::Sources {
                        // Some backends report numeric source ids as JSON
                        // numbers; the URL codec always decodes sources as
                        // strings. Normalize here so the two forms compare
                        // equal under filters_equal.
                        for entry in &mut filters {
                            if let FilterValue::Asn(id) = entry.value {
                                entry.value = FilterValue::Source(id.to_string());
                            }
                        }
                    }
                    state.group_mut(key).filters = filters;
                }
                None => log::debug!("ignoring unknown filter group '{}'", group.key),
            }
        }
        Ok(state)
    }
}

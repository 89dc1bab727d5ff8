//! URL query-string codec for filter state.
//!
//! The query string is the only durable representation of applied filters:
//! it survives navigation and is re-parsed into the next API request. Only
//! values are persisted; display names and cardinalities are re-derived from
//! the next facet response.
//!
//! Encoded form, groups in fixed order, empty groups skipped:
//!
//! ```text
//! &sources=rs01,rs02&asns=6695&communities=65535:666&large_communities=1234:1:2
//! ```

use crate::models::{
    Community, ExtendedCommunity, FilterEntry, FilterState, FilterValue, GroupKey, LargeCommunity,
};
use itertools::Itertools;
use log::warn;

/// Encodes the applied filters as a query-string fragment. Each non-empty
/// group contributes `&<key>=<values>` with values comma-joined; community
/// tuples are colon-joined. The result is empty when no filters are set.
///
/// Values are emitted verbatim, without percent-escaping: a source id
/// containing `,`, `&` or `=` would corrupt the fragment and not survive
/// [`parse_query`]. Route-server ids never carry these characters.
pub fn encode(state: &FilterState) -> String {
    let mut out = String::new();
    for (key, group) in state.groups() {
        if !group.has_filters() {
            continue;
        }
        let values = group.filters.iter().map(|entry| &entry.value).join(",");
        out.push_str(&format!("&{}={}", key, values));
    }
    out
}

/// Decodes filter state from query parameters. Parameters whose key is not
/// one of the five group keys are ignored; a missing or empty parameter
/// leaves its group empty. Malformed value tokens are dropped individually,
/// keeping the rest of the group.
pub fn decode<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> FilterState {
    let mut state = FilterState::default();
    for (key, raw) in params {
        if let Some(key) = GroupKey::from_key(key) {
            state.group_mut(key).filters = decode_group(key, raw);
        }
    }
    state
}

/// Convenience wrapper over [`decode`] for a raw query-string fragment,
/// with or without a leading `?` or `&`.
pub fn parse_query(query: &str) -> FilterState {
    let pairs = query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='));
    decode(pairs)
}

fn decode_group(key: GroupKey, raw: &str) -> Vec<FilterEntry> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| match decode_value(key, token) {
            Ok(value) => Some(FilterEntry::new(value)),
            Err(err) => {
                warn!("dropping malformed {} filter '{}': {}", key, token, err);
                None
            }
        })
        .collect()
}

fn decode_value(key: GroupKey, token: &str) -> Result<FilterValue, String> {
    match key {
        GroupKey::Sources => Ok(FilterValue::Source(token.to_string())),
        GroupKey::Asns => token
            .parse::<u64>()
            .map(FilterValue::Asn)
            .map_err(|e| e.to_string()),
        GroupKey::Communities => token
            .parse::<Community>()
            .map(|c| FilterValue::Community(c.into()))
            .map_err(|e| e.to_string()),
        GroupKey::ExtCommunities => token
            .parse::<ExtendedCommunity>()
            .map(|c| FilterValue::Community(c.into()))
            .map_err(|e| e.to_string()),
        GroupKey::LargeCommunities => token
            .parse::<LargeCommunity>()
            .map(|c| FilterValue::Community(c.into()))
            .map_err(|e| e.to_string()),
    }
}

/*!
bgplg-core is the classification and filtering core of a BGP looking-glass
UI: it turns raw community tuples into human-readable labels and semantic
categories, and maintains the multi-facet filter state (route server,
neighbor ASN, three community kinds) across independently fetched result
sets.

Everything here is synchronous and pure: configuration and API payloads go
in as immutable values, labels, classifications, merged facets and encoded
query strings come out. HTTP transport, caching and rendering are caller
concerns.

## Classifying communities

Classification trees map community fields level by level, with `"*"` as the
wildcard fallback, down to label templates:

```
use bgplg_core::{readable_community, Community, CommunityTree, MetaCommunity};

let tree: CommunityTree = serde_json::from_str(
    r#"{"65535": {"666": "Blackhole requested"}, "*": {"*": "Unknown reason"}}"#,
).unwrap();

let community = MetaCommunity::Plain(Community::new(65535, 666));
assert_eq!(
    readable_community(&tree, &community).as_deref(),
    Some("Blackhole requested"),
);
```

RPKI status and blackhole membership come from small positional patterns
matched against the route's communities; see [`RpkiConfig`] and
[`BlackholeConfig`].

## Facet filters

Each result set's response carries applied and available facets as a
[`FacetSet`]. [`merge_facets_all`] folds the per-set facets into the single
aggregate view the filter editor renders, and [`encode`] / [`parse_query`]
persist the applied filters in the URL:

```
use bgplg_core::{encode, parse_query, FilterEntry, FilterState, FilterValue};

let mut filters = FilterState::default();
filters.asns.filters.push(FilterEntry::new(FilterValue::Asn(6695)));

let query = encode(&filters);
assert_eq!(query, "&asns=6695");
assert_eq!(parse_query(&query), filters);
```
*/

pub mod classify;
pub mod error;
pub mod filters;
pub mod models;

pub use classify::{
    expand_vars, readable_community, resolve_communities, BlackholeConfig, CommunityTree, Pattern,
    PatternField, PatternMatch, RpkiClassification, RpkiConfig, RpkiStatus,
};
pub use error::{CommunityParseError, ConfigError};
pub use filters::{decode, encode, merge_facets, merge_facets_all, parse_query};
pub use models::{
    filters_equal, BgpAttributes, Community, CommunityField, ExtendedCommunity, FacetSet,
    FilterEntry, FilterGroup, FilterState, FilterValue, GroupKey, LargeCommunity, MetaCommunity,
};

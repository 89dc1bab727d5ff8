use crate::models::community::{Community, ExtendedCommunity, LargeCommunity, MetaCommunity};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The `bgp` sub-object of a route as reported by the looking-glass backend.
///
/// Every list defaults to empty when the backend omits it, so classification
/// over a route with missing community data degrades to "no match" instead of
/// failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BgpAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop: Option<IpAddr>,
    #[serde(default)]
    pub communities: Vec<Community>,
    #[serde(default)]
    pub ext_communities: Vec<ExtendedCommunity>,
    #[serde(default)]
    pub large_communities: Vec<LargeCommunity>,
}

impl BgpAttributes {
    /// All communities of the route, across the three flavors, in
    /// standard / extended / large order.
    pub fn all_communities(&self) -> impl Iterator<Item = MetaCommunity> + '_ {
        self.communities
            .iter()
            .map(|c| MetaCommunity::Plain(*c))
            .chain(
                self.ext_communities
                    .iter()
                    .map(|c| MetaCommunity::Extended(c.clone())),
            )
            .chain(
                self.large_communities
                    .iter()
                    .map(|c| MetaCommunity::Large(*c)),
            )
    }
}

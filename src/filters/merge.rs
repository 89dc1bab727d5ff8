//! Facet merging across result sets.
//!
//! A looking-glass query fans out into up to three result sets (received,
//! filtered, not-exported routes), each answering with its own applied and
//! available facets. The filter editor shows one aggregate view, so the
//! per-set facets are merged: entries are unioned by value and their
//! cardinalities summed. Summing is correct because the result sets are
//! disjoint route populations; the sum is the occurrence count across their
//! union.
//!
//! The merge is associative and commutative up to entry order, so callers
//! may merge responses as they arrive or all at once, in any order.

use crate::models::{FacetSet, FilterGroup, FilterState, GroupKey};

/// Unions two groups by entry value. Entries from `a` keep their position,
/// entries only in `b` are appended; an entry in both keeps `a`'s copy with
/// the cardinalities summed.
pub fn merge_groups(a: &FilterGroup, b: &FilterGroup) -> FilterGroup {
    let mut filters = a.filters.clone();
    for entry in &b.filters {
        match filters.iter_mut().find(|e| e.value == entry.value) {
            Some(existing) => existing.cardinality += entry.cardinality,
            None => filters.push(entry.clone()),
        }
    }
    FilterGroup { filters }
}

fn merge_states(a: &FilterState, b: &FilterState) -> FilterState {
    let mut merged = FilterState::default();
    for key in GroupKey::ALL {
        *merged.group_mut(key) = merge_groups(a.group(key), b.group(key));
    }
    merged
}

/// Merges two facet sets, `applied` and `available` independently.
pub fn merge_facets(a: &FacetSet, b: &FacetSet) -> FacetSet {
    FacetSet {
        applied: merge_states(&a.applied, &b.applied),
        available: merge_states(&a.available, &b.available),
    }
}

/// Left fold of [`merge_facets`] over any number of sets. An empty input
/// yields the empty facet set.
pub fn merge_facets_all<'a>(sets: impl IntoIterator<Item = &'a FacetSet>) -> FacetSet {
    sets.into_iter()
        .fold(FacetSet::default(), |acc, set| merge_facets(&acc, set))
}

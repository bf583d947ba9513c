//! Attribute owner resolution.
use super::AttributeOwner;

/// Two owners a value may legally live at, tried fine first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerPair {
    pub fine: AttributeOwner,
    pub coarse: AttributeOwner,
}

impl OwnerPair {
    /// Per-point data: vertex, falling back to point.
    pub const POINTS: OwnerPair = OwnerPair {
        fine: AttributeOwner::Vertex,
        coarse: AttributeOwner::Point,
    };

    /// Per-curve data: prim, falling back to detail.
    pub const CURVES: OwnerPair = OwnerPair {
        fine: AttributeOwner::Prim,
        coarse: AttributeOwner::Detail,
    };
}

/// Find which owner of `pair` holds `name`, or `None` when neither does.
pub fn resolve<F>(exists: F, name: &str, pair: OwnerPair) -> Option<AttributeOwner>
where
    F: Fn(&str, AttributeOwner) -> bool,
{
    if exists(name, pair.fine) {
        Some(pair.fine)
    } else if exists(name, pair.coarse) {
        Some(pair.coarse)
    } else {
        None
    }
}

/// Find the finest owner holding `name` across all four granularities.
pub fn query<F>(exists: F, name: &str) -> Option<AttributeOwner>
where
    F: Fn(&str, AttributeOwner) -> bool,
{
    AttributeOwner::ALL
        .into_iter()
        .find(|&owner| exists(name, owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(at: &'static [AttributeOwner]) -> impl Fn(&str, AttributeOwner) -> bool {
        move |_, owner| at.contains(&owner)
    }

    #[test]
    fn fine_owner_wins_when_both_exist() {
        let exists = only(&[AttributeOwner::Prim, AttributeOwner::Detail]);
        assert_eq!(resolve(exists, "a", OwnerPair::CURVES), Some(AttributeOwner::Prim));
    }

    #[test]
    fn falls_back_to_coarse_owner() {
        let exists = only(&[AttributeOwner::Point]);
        assert_eq!(resolve(exists, "a", OwnerPair::POINTS), Some(AttributeOwner::Point));
    }

    #[test]
    fn other_pair_is_never_consulted() {
        let exists = only(&[AttributeOwner::Detail]);
        assert_eq!(resolve(exists, "a", OwnerPair::POINTS), None);
    }

    #[test]
    fn query_prefers_finest_owner() {
        let exists = only(&[AttributeOwner::Point, AttributeOwner::Detail]);
        assert_eq!(query(exists, "a"), Some(AttributeOwner::Point));
        assert_eq!(query(only(&[]), "a"), None);
    }
}

//! Maintenance passes over generated lane profiles.
//!
//! Both passes go through a [`RegistryContext`], so a pass that removed
//! profiles is persisted by the next `flush`.
use super::RegistryContext;
use crate::shape::{ShapeKind, ZoneShape};
use bevy::log::info;
use constants::lane_profile::MIN_GENERATED_PROFILE_NAME_LEN;
use std::collections::HashSet;
use uuid::Uuid;

/// Ids of every lane profile referenced by `shapes`.
/// Splines use their common profile. Polygon points use their own profile, or
/// the common profile when they inherit.
pub fn used_lane_profile_ids<'a, I>(shapes: I) -> HashSet<Uuid>
where
    I: IntoIterator<Item = &'a ZoneShape>,
{
    let mut used = HashSet::new();
    for shape in shapes {
        match shape.kind {
            ShapeKind::Spline => {
                if let Some(common) = &shape.common_lane_profile {
                    used.insert(common.id);
                }
            }
            ShapeKind::Polygon => {
                used.extend((0..shape.points.len()).filter_map(|index| shape.point_lane_profile(index).map(|p| p.id)));
            }
        }
    }
    used
}

/// Drop generated profiles that no shape in `shapes` references.
/// Hand-authored profiles are never touched. Returns the number removed.
pub fn cleanup_generated_lane_profiles<'a, I>(ctx: &mut RegistryContext<'_>, shapes: I) -> usize
where
    I: IntoIterator<Item = &'a ZoneShape>,
{
    let used = used_lane_profile_ids(shapes);
    let prefix = ctx.lane_profile_prefix().to_string();
    let removed = ctx.retain_profiles(|profile| {
        let generated = profile
            .name
            .as_deref()
            .is_some_and(|name| name.starts_with(&prefix) && name.chars().count() >= MIN_GENERATED_PROFILE_NAME_LEN);
        !generated || used.contains(&profile.id)
    });

    info!("[LANE] Cleaned up {} unused generated lane profiles", removed);
    removed
}

/// Drop every generated profile regardless of use. Returns the number removed.
pub fn remove_generated_lane_profiles(ctx: &mut RegistryContext<'_>) -> usize {
    let prefix = ctx.lane_profile_prefix().to_string();
    let removed = ctx.retain_profiles(|profile| !profile.is_generated(&prefix));

    info!("[LANE] Removed {} generated lane profiles", removed);
    removed
}

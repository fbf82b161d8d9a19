//! Target acquisition.

use super::spec::TargetingModule;
use super::{AbilityContext, Target};
use crate::host::SpatialQuery;

impl TargetingModule {
    /// Produces the targets for a cast.
    pub fn acquire<S: SpatialQuery + ?Sized>(&self, host: &S, ctx: &AbilityContext) -> Vec<Target> {
        match self {
            Self::SelfTarget => vec![Target::Entity(ctx.caster)],
            Self::AimPoint {
                max_range,
                snap_to_hit,
                mask,
            } => {
                let range = max_range.max(0.01);
                let mask = mask.unwrap_or(ctx.hit_mask);
                let far = ctx.aim_ray.point_at(range);
                let point = if *snap_to_hit {
                    host.raycast(&ctx.aim_ray, range, mask)
                        .map_or(far, |hit| hit.point)
                } else {
                    far
                };
                vec![Target::Point(point)]
            },
        }
    }
}

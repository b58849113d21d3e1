use super::{PlacementContext, SiteDecision, SiteSelector};
use crate::task::TaskRequest;

/// Always places a task on the site nearest to its device.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl SiteSelector for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn select_site(
        &mut self,
        _task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        Some(SiteDecision::new(ctx.nearest))
    }
}

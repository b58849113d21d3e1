use super::{PlacementContext, SiteDecision, SiteSelector};
use crate::task::TaskRequest;
use crate::topology::SiteId;

/// Sticky placement: the nearest site of the first urgent task is used for
/// every urgent task after it.
///
/// The pin lives as long as the policy does, so it survives generation
/// boundaries within one run.
#[derive(Debug, Clone, Default)]
pub struct EdgeCloud {
    pinned: Option<SiteId>,
}

impl EdgeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pinned(&self) -> Option<SiteId> {
        self.pinned
    }
}

impl SiteSelector for EdgeCloud {
    fn name(&self) -> &'static str {
        "edge-cloud"
    }

    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        let site = *self.pinned.get_or_insert(ctx.nearest);
        let deadline = if site == ctx.nearest {
            task.deadline
        } else {
            ctx.deadline(task, site)
        };
        Some(SiteDecision::new(site).with_deadline(deadline))
    }
}

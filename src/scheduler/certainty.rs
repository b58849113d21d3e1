use super::{PlacementContext, SiteDecision, SiteSelector};
use crate::task::TaskRequest;

/// Picks the site with the widest margin between its deadline and its
/// expected completion time. The first maximal site wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Certainty;

impl SiteSelector for Certainty {
    fn name(&self) -> &'static str {
        "certainty"
    }

    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        let mut best: Option<(crate::topology::SiteId, f64)> = None;
        let mut best_margin = f64::NEG_INFINITY;

        for site in ctx.env.topology.sites() {
            let deadline = ctx.deadline(task, site.id);
            let margin = deadline - ctx.model.etc().mean((site.id, task.task_type));
            if margin > best_margin {
                best_margin = margin;
                best = Some((site.id, deadline));
            }
        }

        let (site, deadline) = best?;
        Some(
            SiteDecision::new(site)
                .with_deadline(deadline)
                .redirected_from(ctx.nearest),
        )
    }
}

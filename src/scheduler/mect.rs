//! Minimum expected completion time.

use super::{PlacementContext, SiteDecision, SiteSelector};
use crate::task::TaskRequest;
use tracing::trace;

/// Picks the site with the lowest ETC mean for the task's type.
///
/// The deadline committed at routing time is shortened by the round trip to
/// the chosen site. No other policy adjusts the deadline this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mect;

impl SiteSelector for Mect {
    fn name(&self) -> &'static str {
        "mect"
    }

    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        let mut best = None;
        let mut best_mean = f64::INFINITY;

        for site in ctx.env.topology.sites() {
            let mean = ctx.model.etc().mean((site.id, task.task_type));
            if mean < best_mean {
                best_mean = mean;
                best = Some(site.id);
            }
        }

        let site = best?;
        let delay = ctx
            .calculator
            .communication_delay(task, site, ctx.env.network);
        trace!(task = task.id.0, site = site.0, mean = best_mean, delay, "mect candidate");

        Some(
            SiteDecision::new(site)
                .with_deadline(task.deadline - delay)
                .redirected_from(ctx.nearest),
        )
    }
}

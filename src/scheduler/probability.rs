//! Deadline-probability placement with neighbour offloading.
//!
//! The local site is scored with its own ETC distribution. Each neighbour is
//! scored with its ETC convolved with the transfer from the local site, and
//! only neighbours that beat the local probability stay in contention. Among
//! several contenders, confidence intervals on the combined means decide
//! whether the runner-ups are distinguishable from the leader.

use super::{PlacementContext, SiteDecision, SiteSelector};
use crate::model::{normal_cdf, ConfidenceInterval};
use crate::task::TaskRequest;
use crate::topology::SiteId;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub site: SiteId,
    pub deadline: f64,
    pub probability: f64,
    pub interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityPolicy;

impl ProbabilityPolicy {
    /// Neighbours of `ctx.nearest` whose probability of meeting their own
    /// deadline is strictly above `local`, in topology order.
    pub fn candidates(
        &self,
        task: &TaskRequest,
        local: f64,
        ctx: &PlacementContext<'_>,
    ) -> Vec<Candidate> {
        let z = ctx.confidence_z;
        let n = ctx.model.sample_count();

        ctx.locator
            .neighbors(ctx.nearest, ctx.env.topology)
            .into_iter()
            .filter_map(|site| {
                let combined = ctx.model.offloaded_completion(ctx.nearest, site, task.task_type);
                let deadline = ctx.deadline(task, site);
                let probability = normal_cdf(combined.mean, combined.stdev, deadline);

                if let Some(s) = ctx.env.topology.site(site) {
                    trace!(
                        task = task.id.0,
                        site = site.0,
                        probability,
                        available = ctx.admission.available_workers(task, s, &ctx.env),
                        "neighbour scored"
                    );
                }

                (probability > local).then(|| Candidate {
                    site,
                    deadline,
                    probability,
                    interval: combined.confidence_interval(z, n),
                })
            })
            .collect()
    }
}

/// Picks among contenders that all beat the local site.
///
/// The leader is the highest probability, earliest on ties. A lone contender
/// wins outright. Otherwise the first contender whose interval is disjoint
/// from the leader's wins, and the leader wins when every interval overlaps.
/// Returns the winner and the leader's probability.
pub fn choose_remote(candidates: &[Candidate]) -> Option<(Candidate, f64)> {
    let mut leader = *candidates.first()?;
    for c in &candidates[1..] {
        if c.probability > leader.probability {
            leader = *c;
        }
    }

    if candidates.len() == 1 {
        return Some((leader, leader.probability));
    }

    let chosen = candidates
        .iter()
        .find(|c| !c.interval.overlaps(&leader.interval))
        .copied()
        .unwrap_or(leader);

    Some((chosen, leader.probability))
}

impl SiteSelector for ProbabilityPolicy {
    fn name(&self) -> &'static str {
        "probability"
    }

    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        let local_deadline = ctx.deadline(task, ctx.nearest);
        let local = ctx
            .model
            .completion(ctx.nearest, task.task_type)
            .probability(local_deadline);

        let candidates = self.candidates(task, local, ctx);

        let Some((winner, reference)) = choose_remote(&candidates) else {
            debug!(task = task.id.0, site = ctx.nearest.0, probability = local, "local site wins");
            return Some(
                SiteDecision::new(ctx.nearest)
                    .with_deadline(local_deadline)
                    .with_probability(local),
            );
        };

        debug!(
            task = task.id.0,
            from = ctx.nearest.0,
            to = winner.site.0,
            probability = winner.probability,
            contenders = candidates.len(),
            "offloading to neighbour"
        );

        Some(
            SiteDecision::new(winner.site)
                .with_deadline(winner.deadline)
                .with_probability(reference)
                .redirected_from(ctx.nearest),
        )
    }
}

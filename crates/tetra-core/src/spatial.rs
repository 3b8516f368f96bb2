use crate::agent::{Agent, AgentId};
use crate::geometry::{self, Vec2};
use rstar::{RTree, RTreeObject, AABB};

/// Lightweight point entry for the R*-tree (id + position only).
#[derive(Clone, Copy, Debug)]
pub struct AgentLocation {
    pub id: AgentId,
    pub position: Vec2,
}

impl RTreeObject for AgentLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Build an R*-tree over agent top-left positions via bulk_load (O(n log n)).
pub fn build_index(agents: &[Agent]) -> RTree<AgentLocation> {
    let locations: Vec<AgentLocation> = agents
        .iter()
        .map(|a| AgentLocation {
            id: a.id,
            position: a.position,
        })
        .collect();
    RTree::bulk_load(locations)
}

/// Exact nearest other agent to `center`, skipping `exclude_id`.
///
/// Grows a square window until the best hit lies within its half-width, so
/// nothing outside the window could be closer. Ties go to the lower id.
pub fn nearest_other(
    tree: &RTree<AgentLocation>,
    center: Vec2,
    exclude_id: AgentId,
    initial_radius: f64,
) -> Option<(AgentId, f64)> {
    let total = tree.size();
    if total < 2 {
        return None;
    }
    let mut radius = initial_radius.max(1.0);
    loop {
        let envelope = AABB::from_corners(
            [center[0] - radius, center[1] - radius],
            [center[0] + radius, center[1] + radius],
        );
        let mut seen = 0usize;
        let mut best: Option<(AgentId, f64)> = None;
        for loc in tree.locate_in_envelope(&envelope) {
            seen += 1;
            if loc.id == exclude_id {
                continue;
            }
            let d = geometry::distance(center, loc.position);
            let better = match best {
                None => true,
                Some((id, bd)) => d < bd || (d == bd && loc.id < id),
            };
            if better {
                best = Some((loc.id, d));
            }
        }
        match best {
            Some((_, d)) if d <= radius => return best,
            _ if seen == total => return best,
            _ => radius *= 2.0,
        }
    }
}

/// Count pairs of boxes that overlap, using the tree to prune candidates.
/// Agent ids must equal their index in `agents`.
pub fn count_overlapping_pairs(tree: &RTree<AgentLocation>, agents: &[Agent]) -> usize {
    let reach = agents.iter().fold([0.0f64, 0.0], |acc, a| {
        [acc[0].max(a.size[0]), acc[1].max(a.size[1])]
    });
    let mut pairs = 0;
    for (idx, agent) in agents.iter().enumerate() {
        let rect = agent.rect();
        // An overlapping peer's top-left lies within the largest box size of ours.
        let envelope = AABB::from_corners(
            [rect.left() - reach[0], rect.top() - reach[1]],
            [rect.right(), rect.bottom()],
        );
        pairs += tree
            .locate_in_envelope(&envelope)
            .filter(|loc| (loc.id as usize) > idx)
            .filter_map(|loc| agents.get(loc.id as usize))
            .filter(|other| rect.overlaps(&other.rect()))
            .count();
    }
    pairs
}

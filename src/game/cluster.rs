//! Cluster detection - finding and popping matching bubbles.
//!
//! A cluster is every settled bubble reachable from a start bubble through a
//! chain of touching bubbles of the start's color. Touching uses the collision
//! distance, not grid adjacency, so two overlapping bubbles are linked even if
//! they do not sit in neighboring cells. When a cluster of 3+ is found, it pops!

use bevy::prelude::*;
use std::collections::HashSet;

use super::{
    bubble::{Bubble, BubbleColor},
    playfield::{BubbleId, Playfield},
};

/// Minimum cluster size to pop (match-3).
pub const MIN_CLUSTER_SIZE: usize = 3;

/// A cluster that was removed from the field.
#[derive(Debug, Clone, PartialEq)]
pub struct PoppedCluster {
    pub color: BubbleColor,
    pub removed: Vec<(BubbleId, Bubble)>,
}

impl PoppedCluster {
    /// Number of bubbles removed.
    pub fn count(&self) -> usize {
        self.removed.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.removed.iter().map(|(_, bubble)| bubble.position)
    }
}

/// Find all bubbles connected to `start` that share its color.
///
/// Uses an unordered worklist: any order of exploration yields the same set.
/// The start bubble is always the first member. An unknown id yields an empty
/// cluster.
pub fn find_cluster(field: &Playfield, start: BubbleId) -> Vec<BubbleId> {
    let Some(start_bubble) = field.get(start) else {
        return Vec::new();
    };
    let color = start_bubble.color;

    let mut visited = HashSet::new();
    let mut cluster = Vec::new();
    let mut to_check = vec![start];

    while let Some(id) = to_check.pop() {
        if !visited.insert(id) {
            continue;
        }
        cluster.push(id);

        let Some(bubble) = field.get(id) else {
            continue;
        };

        for (other_id, other) in field.iter() {
            if other.color == color && !visited.contains(&other_id) && bubble.collides_with(other)
            {
                to_check.push(other_id);
            }
        }
    }

    cluster
}

/// Pop the cluster containing `start` if it is big enough.
///
/// Returns the removed bubbles, or `None` (field untouched) when the cluster
/// has fewer than [`MIN_CLUSTER_SIZE`] members.
pub fn resolve_cluster(field: &mut Playfield, start: BubbleId) -> Option<PoppedCluster> {
    let color = field.get(start)?.color;
    let cluster = find_cluster(field, start);

    if cluster.len() < MIN_CLUSTER_SIZE {
        debug!(
            "Cluster of {} {:?} bubbles from {} is too small to pop",
            cluster.len(),
            color,
            start
        );
        return None;
    }

    let removed: Vec<_> = cluster
        .into_iter()
        .filter_map(|id| field.remove(id).map(|bubble| (id, bubble)))
        .collect();

    info!(
        "Popped cluster of {} {:?} bubbles, {} left on the field",
        removed.len(),
        color,
        field.len()
    );

    Some(PoppedCluster { color, removed })
}

//! The playfield that holds all settled bubbles.
//!
//! Bubbles live in a generational arena: a [`BubbleId`] stays valid until its
//! bubble is removed, and a stale id never aliases a newer bubble that reuses
//! the same slot. Removal is O(1).

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::{Bubble, BubbleColor},
    geometry,
    grid::{cell_center, snap_to_grid},
};
use crate::config::GameConfig;

/// Stable handle to a settled bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleId {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for BubbleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    bubble: Option<Bubble>,
}

/// The set of settled bubbles plus the rectangle they live in.
#[derive(Debug, Clone)]
pub struct Playfield {
    size: Vec2,
    bubble_radius: f32,
    cell_size: f32,
    placement_tolerance: f32,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Playfield {
    /// Create an empty playfield.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            size: Vec2::new(config.width, config.height),
            bubble_radius: config.bubble_radius,
            cell_size: config.cell_size(),
            placement_tolerance: config.placement_tolerance,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store a bubble and return its handle.
    pub fn insert(&mut self, bubble: Bubble) -> BubbleId {
        debug_assert!(bubble.position.is_finite(), "settled bubble must be finite");
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.bubble = Some(bubble);
            return BubbleId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            bubble: Some(bubble),
        });
        BubbleId {
            index,
            generation: 0,
        }
    }

    /// Remove a bubble. Returns `None` for stale or unknown ids.
    pub fn remove(&mut self, id: BubbleId) -> Option<Bubble> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let bubble = slot.bubble.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(bubble)
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.bubble.as_ref())
    }

    #[cfg(test)]
    pub fn contains(&self, id: BubbleId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over settled bubbles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BubbleId, &Bubble)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.bubble.as_ref().map(|bubble| {
                (
                    BubbleId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    bubble,
                )
            })
        })
    }

    /// Distinct colors still on the field, in palette order.
    pub fn colors_present(&self) -> Vec<BubbleColor> {
        BubbleColor::ALL
            .into_iter()
            .filter(|color| self.iter().any(|(_, b)| b.color == *color))
            .collect()
    }

    /// First settled bubble the given bubble touches, if any.
    pub fn first_collision(&self, bubble: &Bubble) -> Option<BubbleId> {
        self.iter()
            .find(|(_, settled)| bubble.collides_with(settled))
            .map(|(id, _)| id)
    }

    /// Whether a flying bubble's top edge has reached the top boundary.
    pub fn reaches_top(&self, bubble: &Bubble) -> bool {
        bubble.top() <= 0.0
    }

    /// Whether a flying bubble's bottom edge has reached the bottom boundary.
    pub fn reaches_bottom(&self, bubble: &Bubble) -> bool {
        bubble.bottom() >= self.size.y
    }

    /// Pull a newly snapped bubble to exactly one cell away from its nearest
    /// close neighbor.
    ///
    /// A neighbor counts when its center is strictly closer than
    /// `cell_size - tolerance`. Without one, the position is left alone. The
    /// result may still overlap other neighbors slightly.
    pub fn adjust_placement(&self, bubble: &mut Bubble) {
        let cell_size = self.cell_size();

        let closest = self
            .iter()
            .filter(|(_, other)| {
                geometry::within_cell(
                    other.position,
                    bubble.position,
                    cell_size,
                    self.placement_tolerance,
                )
            })
            .map(|(_, other)| {
                (
                    other.position,
                    geometry::center_distance(bubble.position, other.position),
                )
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((anchor, _)) = closest {
            let angle = geometry::angle_between(anchor, bubble.position);
            bubble.position = anchor + Vec2::new(angle.cos(), angle.sin()) * cell_size;
        }
    }

    /// Force a bubble's circle fully inside the playfield.
    pub fn clamp_in_bounds(&self, bubble: &mut Bubble) {
        let r = bubble.radius;
        bubble.position.x = bubble.position.x.clamp(r, self.size.x - r);
        bubble.position.y = bubble.position.y.clamp(r, self.size.y - r);
    }

    /// Whether a bubble's circle lies inside the playfield.
    pub fn in_bounds(&self, bubble: &Bubble) -> bool {
        bubble.left() >= 0.0
            && bubble.top() >= 0.0
            && bubble.right() <= self.size.x
            && bubble.bottom() <= self.size.y
    }

    /// Turn a flying bubble into a settled one: snap, adjust, clamp, store.
    pub fn settle(&mut self, mut bubble: Bubble) -> BubbleId {
        let raw = bubble.position;
        bubble.position = snap_to_grid(bubble.position, self.cell_size());
        self.adjust_placement(&mut bubble);
        self.clamp_in_bounds(&mut bubble);
        debug_assert!(self.in_bounds(&bubble), "settled bubble left the playfield");

        let id = self.insert(bubble);
        debug!(
            "Settled bubble {} from {:?} at {:?}",
            id,
            raw,
            self.get(id).map(|b| b.position)
        );
        id
    }

    /// Fill the top third of the field with a grid of random bubbles.
    ///
    /// Returns the number of bubbles placed.
    pub fn seed_layout(&mut self, rng: &mut impl Rng) -> usize {
        let cell_size = self.cell_size();
        let rows = ((self.size.y / 3.0) / cell_size).floor() as u32;
        let cols = (self.size.x / cell_size).floor() as u32;

        for row in 0..rows {
            for col in 0..cols {
                let color = BubbleColor::random(rng);
                let position = cell_center(col, row, cell_size);
                self.insert(Bubble::settled(color, position, self.bubble_radius));
            }
        }

        (rows * cols) as usize
    }
}

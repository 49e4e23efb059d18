//! Bubbles - the main game objects.
//!
//! A bubble is a colored circle. While it flies it carries a travel angle and
//! bounces off the side walls; once settled it never moves again.

use bevy::prelude::*;
use rand::Rng;

use super::geometry;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
}

/// The different bubble colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BubbleColor {
    Red,
    Green,
    Blue,
}

impl BubbleColor {
    /// The full palette, in draw order.
    pub const ALL: [BubbleColor; 3] = [BubbleColor::Red, BubbleColor::Green, BubbleColor::Blue];

    /// Get the render color for this bubble color.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::Red => Color::srgb(1.0, 0.0, 0.0),
            BubbleColor::Green => Color::srgb(0.0, 1.0, 0.0),
            BubbleColor::Blue => Color::srgb(0.0, 0.0, 1.0),
        }
    }

    /// Pick a color uniformly from the full palette.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A bubble, flying or settled.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub position: Vec2,
    pub color: BubbleColor,
    pub radius: f32,
    /// Travel angle in radians, measured from the +x axis with "up" positive.
    /// Only meaningful while the bubble is in flight.
    pub angle: f32,
}

impl Bubble {
    /// A resting bubble.
    pub fn settled(color: BubbleColor, position: Vec2, radius: f32) -> Self {
        Self::flying(color, position, radius, 0.0)
    }

    /// A bubble launched along `angle`.
    pub fn flying(color: BubbleColor, position: Vec2, radius: f32, angle: f32) -> Self {
        debug_assert!(position.is_finite(), "bubble position must be finite");
        Self {
            position,
            color,
            radius,
            angle,
        }
    }

    /// Whether this bubble touches `other`.
    pub fn collides_with(&self, other: &Bubble) -> bool {
        geometry::circles_collide(self.position, other.position, self.radius)
    }

    /// Move one step along the travel angle, then bounce off the side walls.
    ///
    /// Playfield y grows downward, so an upward angle decreases y. The position
    /// is not clamped here; a bubble that crossed a wall is pulled back in by the
    /// reflected angle on the following steps, or clamped when it settles.
    pub fn advance(&mut self, speed: f32, field_width: f32) {
        self.position.x += speed * self.angle.cos();
        self.position.y -= speed * self.angle.sin();

        if self.left() <= 0.0 || self.right() >= field_width {
            self.angle = std::f32::consts::PI - self.angle;
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.radius
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.radius
    }
}

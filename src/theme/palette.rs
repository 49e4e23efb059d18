use bevy::prelude::*;

/// Black playfield background.
pub const BACKGROUND: Color = Color::BLACK;

/// White text for headers
pub const HEADER_TEXT: Color = Color::WHITE;

/// White text for labels
pub const LABEL_TEXT: Color = Color::WHITE;

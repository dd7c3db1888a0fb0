//! Trail-to-card hit detection
//!
//! A slash is any live trail sample close enough to a card's center. Both
//! sides stay tiny (a few dozen trail points, at most two cards), so a plain
//! pairwise scan is enough.

use glam::Vec2;

use super::state::{Arena, Card, SaberPoint};
use crate::within_radius;

/// First live trail point strictly inside `radius` of `center`
pub fn trail_hit(trail: &[SaberPoint], center: Vec2, radius: f32) -> Option<&SaberPoint> {
    trail
        .iter()
        .filter(|p| p.life > 0)
        .find(|p| within_radius(p.pos, center, radius))
}

/// Whether the trail slashes an unresolved card
pub fn card_is_hit(trail: &[SaberPoint], card: &Card) -> bool {
    !card.is_slashed && trail_hit(trail, card.pos, card.hit_radius()).is_some()
}

/// Whether a card has fallen out of play
pub fn below_exit(card: &Card, arena: &Arena) -> bool {
    card.pos.y > arena.exit_line()
}

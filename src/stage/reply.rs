//! Motion selection for chat replies.
//!
//! A reply may name an animation the character does not have. The fallback lives here, on the
//! caller side, and only goes through the public playback API.

use crate::animation::IDLE;

/// The playback surface a reply handler needs.
pub trait AnimationPlayer {
    fn play_animation(&mut self, name: &str) -> bool;
    fn has_animation(&self, name: &str) -> bool;
    fn available_animations(&self) -> Vec<String>;
}

/// Plays the motion requested by a reply, falling back to idle or the first animation.
///
/// Returns the name that ended up playing.
pub fn apply_reply_motion<P: AnimationPlayer + ?Sized>(player: &mut P, requested: Option<&str>) -> Option<String> {
    let Some(requested) = requested.filter(|name| !name.is_empty()) else {
        return (player.has_animation(IDLE) && player.play_animation(IDLE)).then(|| IDLE.to_string());
    };

    if player.play_animation(requested) {
        return Some(requested.to_string());
    }

    log::warn!("Reply motion '{requested}' unavailable, falling back");
    let available = player.available_animations();
    let fallback = available
        .iter()
        .find(|name| name.as_str() == IDLE)
        .or_else(|| available.first())?;
    player.play_animation(fallback).then(|| fallback.clone())
}

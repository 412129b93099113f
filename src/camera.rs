/// Horizontal scroll offset. Stateless: recomputed from the player every tick
/// and snapped, never eased.
pub fn follow(player_x: f32, follow_offset: f32, level_width: f32, viewport_width: f32) -> f32 {
    let max_offset = (level_width - viewport_width).max(0.0);
    (player_x - follow_offset).clamp(0.0, max_offset)
}

/// Convert a world x coordinate into a viewport-relative one.
pub fn to_view(world_x: f32, camera: f32) -> f32 {
    world_x - camera
}

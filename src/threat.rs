use super::vec2::Vec2;

/// Whether `point` sits on the segment `a`-`b`, give or take a unit: the
/// segment length and the summed detour are truncated to integers before
/// comparing.
pub fn is_colinear_between(point: Vec2, a: Vec2, b: Vec2) -> bool {
    let total = a.dist(b) as i64;
    let detour = (a.dist(point) + point.dist(b)) as i64;
    total - detour == 0
}

/// Only the first indestructible blocker is looked at. It is bypassed when
/// a destructible obstacle sits between the shooter and it.
pub fn is_shot_safe(shooter: Vec2, target: Vec2, walls: &[Vec2], destructibles: &[Vec2]) -> bool {
    match walls
        .iter()
        .find(|w| is_colinear_between(**w, shooter, target))
    {
        Some(&blocker) => destructibles
            .iter()
            .any(|d| is_colinear_between(*d, shooter, blocker)),
        None => true,
    }
}

/// Every wall must be clear on its own for the shot to go.
pub fn shot_clear(shooter: Vec2, target: Vec2, walls: &[Vec2], destructibles: &[Vec2]) -> bool {
    walls
        .iter()
        .all(|w| is_shot_safe(shooter, target, std::slice::from_ref(w), destructibles))
}

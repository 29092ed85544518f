use crate::rng::Rng;
use crate::types::{Direction, Vec2};

pub(super) fn euclidean(ax: i32, ay: i32, bx: i32, by: i32) -> f64 {
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Point `lead` pixels ahead of `pos` along `dir`; `pos` itself when the
/// direction is not cardinal.
pub(super) fn ahead_of(pos: Vec2, dir: Direction, lead: i32) -> Vec2 {
    let (dx, dy) = dir.delta();
    Vec2 {
        x: pos.x + dx * lead,
        y: pos.y + dy * lead,
    }
}

/// Ghost turn filter: both moves must be cardinal and `next` must not be the
/// exact opposite of `last`.
pub(super) fn non_reversing(last: Direction, next: Direction) -> bool {
    last.is_cardinal() && next.is_cardinal() && next != last.opposite()
}

pub(super) fn random_direction(rng: &mut Rng) -> Direction {
    match rng.int(0, 3) {
        0 => Direction::Up,
        1 => Direction::Left,
        2 => Direction::Down,
        _ => Direction::Right,
    }
}

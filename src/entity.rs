use crate::constants::TILE_SIZE;
use crate::types::{Direction, Rect, Vec2};
use crate::world::Maze;

/// Movement state shared by the player and the ghosts: pixel position, speed,
/// the last executed move and the queued one, plus the spawn point used for
/// respawns.
#[derive(Clone, Debug)]
pub struct EntityCore {
    pub x: i32,
    pub y: i32,
    pub speed: i32,
    pub last_move: Direction,
    pub next_move: Direction,
    pub alive: bool,
    spawn: Vec2,
}

impl EntityCore {
    pub fn new(spawn: Vec2, speed: i32) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            speed,
            last_move: Direction::None,
            next_move: Direction::None,
            alive: true,
            spawn,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x / TILE_SIZE, self.y / TILE_SIZE)
    }

    /// True when stepping `speed` pixels in `dir` would leave the world or
    /// strictly overlap a wall. A non-cardinal direction is no move at all,
    /// so it never collides.
    pub fn check_collision(&self, maze: &Maze, dir: Direction) -> bool {
        if !dir.is_cardinal() {
            return false;
        }
        let (dx, dy) = dir.delta();
        let future_x = self.x + dx * self.speed;
        let future_y = self.y + dy * self.speed;
        if maze.out_of_bounds(future_x, future_y) {
            return true;
        }
        maze.hits_wall(&Rect::tile(future_x, future_y))
    }

    /// Executes one move. A queued `next_move` that has become free is
    /// substituted for `dir` and the queue cleared, which is what lets a
    /// buffered turn fire exactly at the junction tile. Fails without any
    /// state change when the direction is invalid or blocked.
    pub fn advance(&mut self, maze: &Maze, dir: Direction) -> bool {
        if !dir.is_cardinal() {
            return false;
        }
        let mut dir = dir;
        if self.next_move.is_cardinal() && !self.check_collision(maze, self.next_move) {
            dir = self.next_move;
            self.next_move = Direction::None;
        }
        if self.check_collision(maze, dir) {
            return false;
        }
        let (dx, dy) = dir.delta();
        self.x += dx * self.speed;
        self.y += dy * self.speed;
        self.last_move = dir;
        true
    }

    /// Restores the spawn position. Deliberately leaves `last_move`,
    /// `next_move` and `alive` alone: a parked dead ghost stays dead, and
    /// callers that revive an entity do so explicitly.
    pub fn reset(&mut self) {
        self.x = self.spawn.x;
        self.y = self.spawn.y;
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 7x5, open interior with one junction gap below the top corridor
    const CORRIDOR_MAP: &str = "3111114\n2p00002\n2111012\n2000002\n5111116\n";

    fn corridor() -> Maze {
        Maze::parse(CORRIDOR_MAP).expect("map should parse")
    }

    #[test]
    fn collision_against_walls_and_bounds() {
        let maze = corridor();
        let core = EntityCore::new(Vec2 { x: 16, y: 16 }, 16);
        assert!(core.check_collision(&maze, Direction::Up));
        assert!(core.check_collision(&maze, Direction::Left));
        assert!(core.check_collision(&maze, Direction::Down));
        assert!(!core.check_collision(&maze, Direction::Right));
        assert!(!core.check_collision(&maze, Direction::None));

        let mut runaway = EntityCore::new(Vec2 { x: 0, y: 16 }, 16);
        runaway.x = -16;
        assert!(runaway.check_collision(&maze, Direction::Left));
    }

    #[test]
    fn sub_tile_step_into_a_wall_is_still_a_collision() {
        let maze = corridor();
        let core = EntityCore::new(Vec2 { x: 16, y: 16 }, 4);
        // a 4px step up would strictly overlap the border wall above
        assert!(core.check_collision(&maze, Direction::Up));
        assert!(!core.check_collision(&maze, Direction::Right));
    }

    #[test]
    fn failed_advance_mutates_nothing() {
        let maze = corridor();
        let mut core = EntityCore::new(Vec2 { x: 16, y: 16 }, 16);
        core.last_move = Direction::Right;
        assert!(!core.advance(&maze, Direction::Up));
        assert!(!core.advance(&maze, Direction::None));
        assert_eq!((core.x, core.y), (16, 16));
        assert_eq!(core.last_move, Direction::Right);
    }

    #[test]
    fn successful_advance_applies_exactly_one_speed_step() {
        let maze = corridor();
        let mut core = EntityCore::new(Vec2 { x: 16, y: 16 }, 4);
        assert!(core.advance(&maze, Direction::Right));
        assert_eq!((core.x, core.y), (20, 16));
        assert_eq!(core.last_move, Direction::Right);
    }

    #[test]
    fn queued_turn_fires_exactly_at_the_junction_tile() {
        let maze = corridor();
        let mut core = EntityCore::new(Vec2 { x: 16, y: 16 }, 16);
        core.last_move = Direction::Right;
        // queue a turn that is blocked for the next three tiles
        assert!(core.check_collision(&maze, Direction::Down));
        core.next_move = Direction::Down;

        assert!(core.advance(&maze, core.last_move));
        assert_eq!((core.x, core.y), (32, 16));
        assert_eq!(core.next_move, Direction::Down);

        assert!(core.advance(&maze, core.last_move));
        assert_eq!((core.x, core.y), (48, 16));
        assert_eq!(core.next_move, Direction::Down);

        assert!(core.advance(&maze, core.last_move));
        assert_eq!((core.x, core.y), (64, 16));
        assert_eq!(core.next_move, Direction::Down);

        // the gap below (64, 16) opens the queued move up
        assert!(core.advance(&maze, core.last_move));
        assert_eq!((core.x, core.y), (64, 32));
        assert_eq!(core.last_move, Direction::Down);
        assert_eq!(core.next_move, Direction::None);
    }

    #[test]
    fn reset_restores_spawn_but_keeps_move_state() {
        let maze = corridor();
        let mut core = EntityCore::new(Vec2 { x: 16, y: 16 }, 16);
        core.last_move = Direction::Right;
        assert!(core.advance(&maze, Direction::Right));
        core.alive = false;
        core.next_move = Direction::Down;

        core.reset();
        assert_eq!((core.x, core.y), (16, 16));
        assert!(!core.alive);
        assert_eq!(core.last_move, Direction::Right);
        assert_eq!(core.next_move, Direction::Down);
    }
}

use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::constants::RESTART_DELAY_TICKS;
use crate::entity::EntityCore;
use crate::rng::Rng;
use crate::types::{
    CellKind, Direction, GhostKind, GhostView, Outcome, PlayerView, RuntimeEvent, Snapshot, Vec2,
};
use crate::world::{MapError, Maze};

mod ghost_system;
mod mode_system;
mod utils;

use self::mode_system::ModeState;

#[derive(Clone, Debug)]
struct GhostInternal {
    core: EntityCore,
    kind: GhostKind,
    corner: Vec2,
    last_target: Option<Vec2>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// One game session: the maze, the player, the ghosts, the mode machine and
/// the win/lose counters, advanced one tick at a time by the external frame
/// loop. Ghosts tick before the player, so targeting always sees the
/// previous tick's player state.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    pristine_maze: Maze,
    maze: Maze,
    rng: Rng,
    mode: ModeState,
    player: EntityCore,
    ghosts: Vec<GhostInternal>,
    lives: u32,
    fruits_remaining: u32,
    tick_counter: u64,
    outcome: Option<Outcome>,
    restart_in: u32,
    debug: bool,
    events: Vec<RuntimeEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, SessionError> {
        config.validate()?;
        let maze = Maze::load(&config.map)?;
        Self::build(config, maze, seed)
    }

    /// Builds a session from already-loaded map text. Used by tests and by
    /// callers that keep their maps somewhere other than disk.
    pub fn from_parts(config: GameConfig, map_text: &str, seed: u32) -> Result<Self, SessionError> {
        config.validate()?;
        let maze = Maze::parse(map_text)?;
        Self::build(config, maze, seed)
    }

    fn build(config: GameConfig, maze: Maze, seed: u32) -> Result<Self, SessionError> {
        let player = Self::make_player(&maze, config.speed);
        let ghosts = Self::make_ghosts(&maze, config.speed);
        let mode = ModeState::new(config.mode_lengths.clone());
        let lives = config.lives;
        let fruits_remaining = maze.fruit_count;
        Ok(Self {
            config,
            pristine_maze: maze.clone(),
            maze,
            rng: Rng::new(seed),
            mode,
            player,
            ghosts,
            lives,
            fruits_remaining,
            tick_counter: 0,
            outcome: None,
            restart_in: 0,
            debug: false,
            events: Vec::new(),
        })
    }

    fn make_player(maze: &Maze, speed: i32) -> EntityCore {
        let mut player = EntityCore::new(maze.player_spawn, speed);
        player.last_move = Direction::Left;
        player
    }

    fn make_ghosts(maze: &Maze, speed: i32) -> Vec<GhostInternal> {
        maze.ghost_spawns
            .iter()
            .map(|&(kind, spawn)| GhostInternal {
                core: EntityCore::new(spawn, speed),
                kind,
                corner: Self::corner_for(kind, maze),
                last_target: None,
            })
            .collect()
    }

    fn corner_for(kind: GhostKind, maze: &Maze) -> Vec2 {
        match kind {
            GhostKind::Chaser => Vec2 { x: 0, y: 0 },
            GhostKind::Ambusher => Vec2 {
                x: maze.width_px,
                y: 0,
            },
            GhostKind::Ignorant => Vec2 {
                x: 0,
                y: maze.height_px,
            },
            GhostKind::Whim => Vec2 {
                x: maze.width_px,
                y: maze.height_px,
            },
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn fruits_remaining(&self) -> u32 {
        self.fruits_remaining
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Feeds one tick's directional input into the player's move queue: a
    /// direction that collides right now is buffered as `next_move`, a free
    /// one becomes `last_move` immediately and drops any buffered turn.
    pub fn apply_input(&mut self, dir: Direction) {
        if self.outcome.is_some() || !dir.is_cardinal() {
            return;
        }
        if self.player.check_collision(&self.maze, dir) {
            self.player.next_move = dir;
        } else {
            self.player.last_move = dir;
            self.player.next_move = Direction::None;
        }
    }

    /// One simulation tick. While an outcome is pending this only counts the
    /// restart delay down and then rebuilds the session in place.
    pub fn step(&mut self) {
        if self.outcome.is_some() {
            self.restart_in = self.restart_in.saturating_sub(1);
            if self.restart_in == 0 {
                self.reset_session();
            }
            return;
        }

        self.tick_counter += 1;
        self.mode
            .step(self.tick_counter, self.config.frightened_length);
        for idx in 0..self.ghosts.len() {
            self.tick_ghost(idx);
        }
        self.tick_player();
        self.check_outcome();
    }

    fn tick_player(&mut self) {
        self.player.advance(&self.maze, self.player.last_move);
        self.check_power_up_collision();
        self.check_ghost_collision();
    }

    fn check_power_up_collision(&mut self) {
        let x = self.player.x;
        let y = self.player.y;
        match self.maze.cell_at(x, y) {
            CellKind::Fruit => {
                self.fruits_remaining = self.fruits_remaining.saturating_sub(1);
                self.maze.clear_cell(x, y);
                self.events.push(RuntimeEvent::FruitEaten {
                    x,
                    y,
                    remaining: self.fruits_remaining,
                });
            }
            CellKind::SuperFruit => {
                self.maze.clear_cell(x, y);
                self.mode.enter_frightened(self.tick_counter, false);
                self.events.push(RuntimeEvent::SuperFruitEaten { x, y });
            }
            CellKind::SodaCan => {
                self.maze.clear_cell(x, y);
                self.mode.enter_frightened(self.tick_counter, true);
                self.events.push(RuntimeEvent::SodaCanEaten { x, y });
            }
            _ => {}
        }
    }

    fn check_ghost_collision(&mut self) {
        let (player_col, player_row) = self.player.tile();
        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if !ghost.core.alive {
                continue;
            }
            let (ghost_col, ghost_row) = ghost.core.tile();
            if ghost_col != player_col || ghost_row != player_row {
                continue;
            }
            if self.mode.frightened() {
                self.ghosts[idx].core.alive = false;
                self.events.push(RuntimeEvent::GhostEaten {
                    ghost: self.ghosts[idx].kind,
                });
            } else {
                self.lives = self.lives.saturating_sub(1);
                for ghost in &mut self.ghosts {
                    ghost.core.reset();
                    ghost.core.alive = true;
                }
                self.player.reset();
                self.player.last_move = Direction::Left;
                self.events.push(RuntimeEvent::LifeLost {
                    remaining: self.lives,
                });
                // the life loss resolves the whole tick; remaining ghosts
                // are not checked against the respawned player
                return;
            }
        }
    }

    fn check_outcome(&mut self) {
        if self.fruits_remaining == 0 {
            self.outcome = Some(Outcome::Won);
            self.events.push(RuntimeEvent::GameWon);
            self.restart_in = RESTART_DELAY_TICKS;
        } else if self.lives == 0 {
            self.outcome = Some(Outcome::Lost);
            self.events.push(RuntimeEvent::GameLost);
            self.restart_in = RESTART_DELAY_TICKS;
        }
    }

    fn reset_session(&mut self) {
        self.maze = self.pristine_maze.clone();
        self.player = Self::make_player(&self.maze, self.config.speed);
        self.ghosts = Self::make_ghosts(&self.maze, self.config.speed);
        self.mode = ModeState::new(self.config.mode_lengths.clone());
        self.lives = self.config.lives;
        self.fruits_remaining = self.maze.fruit_count;
        self.tick_counter = 0;
        self.outcome = None;
        self.restart_in = 0;
        self.debug = false;
        self.events.push(RuntimeEvent::SessionReset);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let ghosts = self
            .ghosts
            .iter()
            .map(|ghost| GhostView {
                x: ghost.core.x,
                y: ghost.core.y,
                dir: ghost.core.last_move,
                kind: ghost.kind,
                alive: ghost.core.alive,
                frightened: self.mode.frightened(),
                hidden: self.mode.soda_can_effect(),
                target: if self.debug { ghost.last_target } else { None },
            })
            .collect();

        let snapshot = Snapshot {
            tick: self.tick_counter,
            scatter: self.mode.scatter(),
            frightened: self.mode.frightened(),
            soda_can_effect: self.mode.soda_can_effect(),
            lives: self.lives,
            fruits_remaining: self.fruits_remaining,
            outcome: self.outcome,
            restart_in_ticks: self.restart_in,
            player: PlayerView {
                x: self.player.x,
                y: self.player.y,
                dir: self.player.last_move,
            },
            ghosts,
            tiles: self.maze.tile_rows(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TICK_RATE;
    use std::path::PathBuf;

    // single fruit three tiles right of the player
    const WIN_MAP: &str = "3111114\n2p00072\n5111116\n";

    // open room with one chaser and fruit spread out of the way
    const ARENA_MAP: &str = "\
311111114\n\
2p0000002\n\
200000002\n\
20000c002\n\
200000072\n\
277000072\n\
511111116\n";

    fn config(speed: i32, lives: u32, mode_lengths: Vec<u32>) -> GameConfig {
        GameConfig {
            map: PathBuf::from("unused"),
            lives,
            speed,
            frightened_length: 7,
            mode_lengths,
        }
    }

    fn session(map: &str, speed: i32, lives: u32) -> GameSession {
        GameSession::from_parts(config(speed, lives, vec![7]), map, 7)
            .expect("session should build")
    }

    #[test]
    fn invalid_config_refuses_to_build_a_session() {
        let result = GameSession::from_parts(config(3, 3, vec![7]), WIN_MAP, 7);
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn malformed_map_refuses_to_build_a_session() {
        let result = GameSession::from_parts(config(16, 3, vec![7]), "311\n2z2\n511\n", 7);
        assert!(matches!(result, Err(SessionError::Map(_))));
    }

    #[test]
    fn input_that_collides_is_queued_instead_of_applied() {
        let mut session = session(WIN_MAP, 16, 3);
        session.apply_input(Direction::Up);
        assert_eq!(session.player.last_move, Direction::Left);
        assert_eq!(session.player.next_move, Direction::Up);

        session.apply_input(Direction::Right);
        assert_eq!(session.player.last_move, Direction::Right);
        assert_eq!(session.player.next_move, Direction::None);

        session.apply_input(Direction::None);
        assert_eq!(session.player.last_move, Direction::Right);
    }

    #[test]
    fn eating_the_last_fruit_wins_and_arms_the_restart_countdown() {
        let mut session = session(WIN_MAP, 16, 3);
        session.apply_input(Direction::Right);
        for _ in 0..4 {
            session.step();
        }
        assert_eq!(session.fruits_remaining(), 0);
        assert_eq!(session.outcome(), Some(Outcome::Won));
        assert_eq!(session.restart_in, RESTART_DELAY_TICKS);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::GameWon)));
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::FruitEaten { remaining: 0, .. })));
    }

    #[test]
    fn restart_countdown_rebuilds_the_session_from_config() {
        let mut session = session(WIN_MAP, 16, 3);
        session.apply_input(Direction::Right);
        for _ in 0..4 {
            session.step();
        }
        assert_eq!(session.outcome(), Some(Outcome::Won));

        for _ in 0..RESTART_DELAY_TICKS {
            session.step();
        }
        assert_eq!(session.outcome(), None);
        assert_eq!(session.tick(), 0);
        assert_eq!(session.fruits_remaining(), 1);
        assert_eq!(session.player.pos(), Vec2 { x: 16, y: 16 });
        assert_eq!(session.player.last_move, Direction::Left);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::SessionReset)));
    }

    #[test]
    fn sharing_a_tile_with_a_ghost_costs_a_life_and_resets_everyone() {
        let mut session = session(ARENA_MAP, 16, 3);
        session.player.x = 64;
        session.player.y = 48;
        session.ghosts[0].core.x = 64;
        session.ghosts[0].core.y = 48;
        session.ghosts[0].core.last_move = Direction::Left;

        session.check_ghost_collision();
        assert_eq!(session.lives(), 2);
        assert_eq!(session.player.pos(), Vec2 { x: 16, y: 16 });
        assert_eq!(session.player.last_move, Direction::Left);
        assert_eq!(session.ghosts[0].core.pos(), Vec2 { x: 80, y: 48 });
        assert!(session.ghosts[0].core.alive);
    }

    #[test]
    fn life_loss_short_circuits_the_remaining_ghost_scan() {
        let map = "3111114\n2p0ca02\n5111116\n";
        let mut session = session(map, 16, 3);
        // both ghosts moved onto the player's tile
        for ghost in &mut session.ghosts {
            ghost.core.x = session.player.x;
            ghost.core.y = session.player.y;
        }
        session.check_ghost_collision();
        // one life for the whole pile-up, not one per ghost
        assert_eq!(session.lives(), 2);
    }

    #[test]
    fn frightened_ghost_on_the_player_tile_is_eaten_without_losing_a_life() {
        let mut session = session(ARENA_MAP, 16, 3);
        session.mode.enter_frightened(session.tick_counter, false);
        session.ghosts[0].core.x = session.player.x;
        session.ghosts[0].core.y = session.player.y;

        session.check_ghost_collision();
        assert!(!session.ghosts[0].core.alive);
        assert_eq!(session.lives(), 3);
        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::GhostEaten { .. })));
    }

    #[test]
    fn superfruit_arms_frightened_and_soda_can_also_hides() {
        let map = "3111114\n2p08s72\n5111116\n";
        let mut session = session(map, 16, 3);
        session.apply_input(Direction::Right);
        session.step();
        session.step();
        assert!(session.mode.frightened());
        assert!(!session.mode.soda_can_effect());

        session.step();
        assert!(session.mode.frightened());
        assert!(session.mode.soda_can_effect());
        let snapshot = session.build_snapshot(true);
        assert!(snapshot.frightened);
        assert!(snapshot.soda_can_effect);
        assert!(snapshot.ghosts.is_empty());
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::SuperFruitEaten { .. })));
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::SodaCanEaten { .. })));
    }

    #[test]
    fn losing_the_last_life_ends_the_session() {
        let mut session = session(ARENA_MAP, 16, 1);
        session.ghosts[0].core.x = session.player.x;
        session.ghosts[0].core.y = session.player.y;
        session.check_ghost_collision();
        session.check_outcome();
        assert_eq!(session.lives(), 0);
        assert_eq!(session.outcome(), Some(Outcome::Lost));
    }

    #[test]
    fn ghosts_act_on_the_previous_ticks_player_position() {
        // the chaser is sealed in its own chamber so nobody collides while
        // the 1s scatter phase runs out
        let split_map = "3111114\n2p02072\n2002c02\n5111116\n";
        let mut session = GameSession::from_parts(config(16, 3, vec![1, 1000]), split_map, 7)
            .expect("session should build");
        for _ in 0..61 {
            session.step();
        }
        assert!(!session.mode.scatter());

        let player_before = session.player.pos();
        session.apply_input(Direction::Down);
        session.step();
        assert_ne!(session.player.pos(), player_before);
        // the chaser aimed at where the player stood before this tick moved it
        let target = session.ghosts[0]
            .last_target
            .expect("chase tick computes a target");
        assert_eq!(target, player_before);
    }

    #[test]
    fn snapshot_drains_events_only_when_asked() {
        let mut session = session(WIN_MAP, 16, 3);
        session.events.push(RuntimeEvent::GameWon);
        let kept = session.build_snapshot(false);
        assert!(kept.events.is_empty());
        let drained = session.build_snapshot(true);
        assert_eq!(drained.events.len(), 1);
        let empty = session.build_snapshot(true);
        assert!(empty.events.is_empty());
    }

    #[test]
    fn debug_mode_exposes_ghost_targets_in_snapshots() {
        let mut session = session(ARENA_MAP, 16, 3);
        session.step();
        let hidden = session.build_snapshot(false);
        assert!(hidden.ghosts[0].target.is_none());

        session.set_debug(true);
        let shown = session.build_snapshot(false);
        assert!(shown.ghosts[0].target.is_some());
    }

    #[test]
    fn same_seed_and_inputs_produce_the_same_progression() {
        let mut a = session(ARENA_MAP, 16, 3);
        let mut b = session(ARENA_MAP, 16, 3);
        let script = [
            Direction::Right,
            Direction::Down,
            Direction::Right,
            Direction::Up,
            Direction::Left,
        ];
        for tick in 0..(10 * TICK_RATE as usize) {
            let dir = script[tick % script.len()];
            a.apply_input(dir);
            b.apply_input(dir);
            a.step();
            b.step();
            let sa = a.build_snapshot(false);
            let sb = b.build_snapshot(false);
            assert_eq!(sa.player.x, sb.player.x);
            assert_eq!(sa.player.y, sb.player.y);
            assert_eq!(sa.lives, sb.lives);
            assert_eq!(sa.fruits_remaining, sb.fruits_remaining);
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!((ga.x, ga.y), (gb.x, gb.y));
                assert_eq!(ga.alive, gb.alive);
            }
        }
    }

    #[test]
    fn player_keeps_rolling_in_its_last_direction_each_tick() {
        let mut session = session(ARENA_MAP, 16, 3);
        session.apply_input(Direction::Down);
        session.step();
        assert_eq!(session.player.pos(), Vec2 { x: 16, y: 32 });
        session.step();
        assert_eq!(session.player.pos(), Vec2 { x: 16, y: 48 });
    }
}

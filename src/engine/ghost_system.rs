use crate::constants::{AMBUSH_LEAD_PX, SHY_RADIUS_PX, WHIM_LEAD_PX};
use crate::types::{Direction, GhostKind, Vec2};

use super::utils::{ahead_of, euclidean, non_reversing, random_direction};
use super::GameSession;

/// Read-only view of the player (and the first chaser) that targeting runs
/// against. Built fresh each tick so ghosts act on the previous tick's
/// player state and never hold an alias into it.
pub(super) struct TargetContext {
    pub player_pos: Vec2,
    pub player_dir: Direction,
    pub chaser_pos: Option<Vec2>,
}

pub(super) fn target_position(
    kind: GhostKind,
    corner: Vec2,
    scatter: bool,
    ghost_pos: Vec2,
    ctx: &TargetContext,
) -> Vec2 {
    if scatter {
        return corner;
    }
    match kind {
        GhostKind::Chaser => ctx.player_pos,
        GhostKind::Ambusher => ahead_of(ctx.player_pos, ctx.player_dir, AMBUSH_LEAD_PX),
        GhostKind::Ignorant => {
            let distance = euclidean(ghost_pos.x, ghost_pos.y, ctx.player_pos.x, ctx.player_pos.y);
            if distance > SHY_RADIUS_PX {
                ctx.player_pos
            } else {
                corner
            }
        }
        GhostKind::Whim => match ctx.chaser_pos {
            Some(chaser) => {
                let ahead = ahead_of(ctx.player_pos, ctx.player_dir, WHIM_LEAD_PX);
                Vec2 {
                    x: chaser.x + 2 * (ahead.x - chaser.x),
                    y: chaser.y + 2 * (ahead.y - chaser.y),
                }
            }
            None => ctx.player_pos,
        },
    }
}

/// All four cardinals ordered by the Euclidean distance from a 1px probe
/// step to the target, shortest first. The probe is deliberately 1px rather
/// than the entity speed. Exact ties keep the fixed Up, Left, Down, Right
/// priority (stable sort over the declaration order).
pub(super) fn rank_moves(from: Vec2, target: Vec2) -> [Direction; 4] {
    let mut probes: Vec<(f64, Direction)> = Direction::CARDINALS
        .iter()
        .map(|&dir| {
            let (dx, dy) = dir.delta();
            let distance = euclidean(from.x + dx, from.y + dy, target.x, target.y);
            (distance, dir)
        })
        .collect();
    probes.sort_by(|a, b| a.0.total_cmp(&b.0));
    [probes[0].1, probes[1].1, probes[2].1, probes[3].1]
}

impl GameSession {
    pub(super) fn target_context(&self) -> TargetContext {
        TargetContext {
            player_pos: self.player.pos(),
            player_dir: self.player.last_move,
            chaser_pos: self
                .ghosts
                .iter()
                .find(|ghost| ghost.kind == GhostKind::Chaser)
                .map(|ghost| ghost.core.pos()),
        }
    }

    pub(super) fn tick_ghost(&mut self, idx: usize) {
        if !self.ghosts[idx].core.alive {
            // eaten ghosts park at spawn until a life-loss reset revives them
            self.ghosts[idx].core.reset();
            return;
        }

        if self.mode.frightened() {
            let dir = random_direction(&mut self.rng);
            let ghost = &mut self.ghosts[idx];
            ghost.core.next_move = dir;
            if non_reversing(ghost.core.last_move, dir) && !ghost.core.check_collision(&self.maze, dir)
            {
                ghost.core.advance(&self.maze, dir);
            }
            return;
        }

        let ctx = self.target_context();
        let scatter = self.mode.scatter();
        let target = target_position(
            self.ghosts[idx].kind,
            self.ghosts[idx].corner,
            scatter,
            self.ghosts[idx].core.pos(),
            &ctx,
        );

        let ghost = &mut self.ghosts[idx];
        ghost.last_target = Some(target);
        let ranked = rank_moves(ghost.core.pos(), target);
        for dir in ranked {
            if non_reversing(ghost.core.last_move, dir) && !ghost.core.check_collision(&self.maze, dir)
            {
                ghost.core.next_move = dir;
                break;
            }
        }

        // keep rolling in the last direction; the queued preference is
        // consumed by `advance` the moment it comes free. The fallback scan
        // skips the reversal filter on purpose, so a cornered ghost may
        // reverse as a last resort.
        if !ghost.core.advance(&self.maze, ghost.core.last_move) {
            for dir in ranked {
                if ghost.core.advance(&self.maze, dir) {
                    break;
                }
            }
        }
    }
}

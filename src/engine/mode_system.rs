use crate::constants::TICK_RATE;

/// Two-level mode timer: the scatter/chase phase cycle, and the frightened
/// override that power-ups arm on top of it. The phase cycle keeps running
/// while frightened, exactly like the frame timer it replaces.
#[derive(Clone, Debug)]
pub struct ModeState {
    scatter: bool,
    frightened: bool,
    soda_can_effect: bool,
    frightened_started: u64,
    phase_lengths: Vec<u32>,
    phase_cursor: usize,
    phase_elapsed: u64,
}

impl ModeState {
    pub fn new(phase_lengths: Vec<u32>) -> Self {
        Self {
            scatter: true,
            frightened: false,
            soda_can_effect: false,
            frightened_started: 0,
            phase_lengths,
            phase_cursor: 0,
            phase_elapsed: 0,
        }
    }

    pub fn scatter(&self) -> bool {
        self.scatter
    }

    pub fn frightened(&self) -> bool {
        self.frightened
    }

    pub fn soda_can_effect(&self) -> bool {
        self.soda_can_effect
    }

    pub fn enter_frightened(&mut self, now_tick: u64, soda_can: bool) {
        self.frightened = true;
        self.frightened_started = now_tick;
        if soda_can {
            self.soda_can_effect = true;
        }
    }

    /// One tick of both timers. Frightened clears once strictly more than
    /// `frightened_length` seconds have elapsed, so a 7s window entered at
    /// tick T holds through T + 420 and is gone at T + 421.
    pub fn step(&mut self, now_tick: u64, frightened_length: u32) {
        if self.frightened {
            let limit = frightened_length as u64 * TICK_RATE as u64;
            if now_tick.saturating_sub(self.frightened_started) > limit {
                self.frightened = false;
                self.soda_can_effect = false;
            }
        }
        self.advance_phase();
    }

    // A single-entry sequence or an exhausted cursor pins scatter for the
    // rest of the session.
    fn advance_phase(&mut self) {
        let phases = self.phase_lengths.len();
        if phases == 1 || self.phase_cursor >= phases {
            self.scatter = true;
            return;
        }
        let limit = self.phase_lengths[self.phase_cursor] as u64 * TICK_RATE as u64;
        if self.phase_elapsed >= limit {
            self.scatter = !self.scatter;
            self.phase_cursor += 1;
            self.phase_elapsed = 0;
        }
        self.phase_elapsed += 1;
    }
}

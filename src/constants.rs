pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const TILE_SIZE: i32 = 16;

pub const RESTART_DELAY_TICKS: u32 = 10 * TICK_RATE;

pub const AMBUSH_LEAD_PX: i32 = 64;
pub const WHIM_LEAD_PX: i32 = 32;
pub const SHY_RADIUS_PX: f64 = 128.0;

pub const DEFAULT_FRIGHTENED_SECS: u32 = 7;

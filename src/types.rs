use serde::Serialize;

use crate::constants::TILE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
    None,
}

impl Direction {
    // Declaration order doubles as the tie-break priority for move ranking.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn is_cardinal(self) -> bool {
        !matches!(self, Direction::None)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Ambusher,
    Chaser,
    Ignorant,
    Whim,
}

impl GhostKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'a' => Some(Self::Ambusher),
            'c' => Some(Self::Chaser),
            'i' => Some(Self::Ignorant),
            'w' => Some(Self::Whim),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSegment {
    Horizontal,
    Vertical,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl WallSegment {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '1' => Some(Self::Horizontal),
            '2' => Some(Self::Vertical),
            '3' => Some(Self::UpLeft),
            '4' => Some(Self::UpRight),
            '5' => Some(Self::DownLeft),
            '6' => Some(Self::DownRight),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Horizontal => '1',
            Self::Vertical => '2',
            Self::UpLeft => '3',
            Self::UpRight => '4',
            Self::DownLeft => '5',
            Self::DownRight => '6',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Wall(WallSegment),
    Fruit,
    SuperFruit,
    SodaCan,
}

impl CellKind {
    pub fn code(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Wall(segment) => segment.code(),
            Self::Fruit => '7',
            Self::SuperFruit => '8',
            Self::SodaCan => 's',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn tile(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            w: TILE_SIZE,
            h: TILE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    FruitEaten {
        x: i32,
        y: i32,
        remaining: u32,
    },
    SuperFruitEaten {
        x: i32,
        y: i32,
    },
    SodaCanEaten {
        x: i32,
        y: i32,
    },
    GhostEaten {
        ghost: GhostKind,
    },
    LifeLost {
        remaining: u32,
    },
    GameWon,
    GameLost,
    SessionReset,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "type")]
    pub kind: GhostKind,
    pub alive: bool,
    pub frightened: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec2>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub scatter: bool,
    pub frightened: bool,
    #[serde(rename = "sodaCanEffect")]
    pub soda_can_effect: bool,
    pub lives: u32,
    #[serde(rename = "fruitsRemaining")]
    pub fruits_remaining: u32,
    pub outcome: Option<Outcome>,
    #[serde(rename = "restartInTicks")]
    pub restart_in_ticks: u32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub tiles: Vec<String>,
    pub events: Vec<RuntimeEvent>,
}

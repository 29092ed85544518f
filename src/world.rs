use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::TILE_SIZE;
use crate::types::{CellKind, GhostKind, Rect, Vec2, WallSegment};

/// The tile grid and the immutable wall set derived from it.
///
/// Built once from map text at session start; the only mutation during play
/// is a power-up cell turning empty when consumed. World bounds derive from
/// the grid dimensions (the classic 28x36 map gives 448x576).
#[derive(Clone, Debug)]
pub struct Maze {
    pub rows: i32,
    pub cols: i32,
    pub width_px: i32,
    pub height_px: i32,
    cells: Vec<Vec<CellKind>>,
    walls: Vec<Rect>,
    pub player_spawn: Vec2,
    pub ghost_spawns: Vec<(GhostKind, Vec2)>,
    pub fruit_count: u32,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("map is empty")]
    EmptyMap,
    #[error("map row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("unknown cell code {code:?} at row {row}, col {col}")]
    UnknownCell { row: usize, col: usize, code: char },
    #[error("map has no player spawn")]
    MissingPlayerSpawn,
}

pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

impl Maze {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        if lines.is_empty() {
            return Err(MapError::EmptyMap);
        }
        let expected = lines[0].chars().count();
        if expected == 0 {
            return Err(MapError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(lines.len());
        let mut walls = Vec::new();
        let mut player_spawn = None;
        let mut ghost_spawns = Vec::new();
        let mut fruit_count = 0;

        for (row, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            if len != expected {
                return Err(MapError::RaggedRow { row, len, expected });
            }
            let mut current_row = Vec::with_capacity(expected);
            for (col, code) in line.chars().enumerate() {
                let x = col as i32 * TILE_SIZE;
                let y = row as i32 * TILE_SIZE;
                let kind = match code {
                    '0' => CellKind::Empty,
                    '7' => {
                        fruit_count += 1;
                        CellKind::Fruit
                    }
                    '8' => CellKind::SuperFruit,
                    's' => CellKind::SodaCan,
                    'p' => {
                        player_spawn = Some(Vec2 { x, y });
                        CellKind::Empty
                    }
                    _ => {
                        if let Some(segment) = WallSegment::from_code(code) {
                            walls.push(Rect::tile(x, y));
                            CellKind::Wall(segment)
                        } else if let Some(kind) = GhostKind::from_code(code) {
                            ghost_spawns.push((kind, Vec2 { x, y }));
                            CellKind::Empty
                        } else {
                            return Err(MapError::UnknownCell { row, col, code });
                        }
                    }
                };
                current_row.push(kind);
            }
            cells.push(current_row);
        }

        let player_spawn = player_spawn.ok_or(MapError::MissingPlayerSpawn)?;
        let rows = cells.len() as i32;
        let cols = expected as i32;
        Ok(Self {
            rows,
            cols,
            width_px: cols * TILE_SIZE,
            height_px: rows * TILE_SIZE,
            cells,
            walls,
            player_spawn,
            ghost_spawns,
            fruit_count,
        })
    }

    pub fn out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x > self.width_px || y < 0 || y > self.height_px
    }

    pub fn hits_wall(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|wall| rect_overlap(rect, wall))
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Cell under a pixel position. Positions outside the grid read as empty.
    pub fn cell_at(&self, x: i32, y: i32) -> CellKind {
        let row = y / TILE_SIZE;
        let col = x / TILE_SIZE;
        if row < 0 || col < 0 || row >= self.rows || col >= self.cols {
            return CellKind::Empty;
        }
        self.cells[row as usize][col as usize]
    }

    pub fn clear_cell(&mut self, x: i32, y: i32) {
        let row = y / TILE_SIZE;
        let col = x / TILE_SIZE;
        if row < 0 || col < 0 || row >= self.rows || col >= self.cols {
            return;
        }
        self.cells[row as usize][col as usize] = CellKind::Empty;
    }

    pub fn tile_rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }
}

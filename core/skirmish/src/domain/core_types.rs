//! 基本資料類型定義

use crate::domain::alias::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// 棋盤位置（座標）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// 曼哈頓距離
    pub fn manhattan_distance(self, other: Position) -> Coord {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 移動方向（四方向，不允許斜向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// 陣營（用於區分友軍/敵軍），值即為陣營索引
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Faction(pub u8);

impl Faction {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "陣營{}", self.0)
    }
}

/// 地形種類
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum TerrainKind {
    #[default]
    Plain,
    Road,
    Forest,
    Mountain,
    City,
    Base,
}

/// 單位種類
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum UnitKind {
    Infantry,
    Recon,
    Tank,
    Artillery,
    Transport,
}

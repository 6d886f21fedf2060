//! 棋盤：Tile 以一維陣列存放，座標轉索引時檢查邊界
//!
//! 這裡只負責結構性操作（放置、移除、搬移），不驗證遊戲規則。

use crate::catalog::Catalogs;
use crate::domain::alias::{Coord, UnitId};
use crate::domain::constants::CAPTURE_COMPLETE;
use crate::domain::core_types::{Direction, Faction, Position, TerrainKind};
use crate::error::{BoardError, Result};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// 據點狀態
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub owner: Option<Faction>,
    /// 0..=100
    pub capture_progress: u32,
    /// 正在累積進度的陣營
    pub capturer: Option<Faction>,
}

impl Objective {
    pub fn owned_by(owner: Faction) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// 捨棄尚未完成的佔領進度
    pub fn clear_progress(&mut self) {
        self.capture_progress = 0;
        self.capturer = None;
    }

    pub fn is_contested(&self) -> bool {
        self.capture_progress > 0 && self.capture_progress < CAPTURE_COMPLETE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub position: Position,
    pub terrain: TerrainKind,
    pub unit: Option<Unit>,
    pub objective: Option<Objective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: Coord,
    height: Coord,
    tiles: Vec<Tile>,
    /// 單位 ID → 位置，Tile 上的單位為權威資料
    unit_index: BTreeMap<UnitId, Position>,
}

impl Board {
    /// 產生填滿單一地形的棋盤
    pub fn new(width: Coord, height: Coord, fill: TerrainKind, catalogs: &Catalogs) -> Self {
        let is_objective = catalogs.terrain(fill).is_objective;
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position { x, y }))
            .map(|position| Tile {
                position,
                terrain: fill,
                unit: None,
                objective: is_objective.then(Objective::default),
            })
            .collect();
        Self {
            width,
            height,
            tiles,
            unit_index: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    /// 驗證位置是否在棋盤邊界內
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            }
            .into());
        }
        Ok(pos.y * self.width + pos.x)
    }

    pub fn tile_at(&self, pos: Position) -> Result<&Tile> {
        let index = self.index(pos)?;
        Ok(&self.tiles[index])
    }

    pub(crate) fn tile_at_mut(&mut self, pos: Position) -> Result<&mut Tile> {
        let index = self.index(pos)?;
        Ok(&mut self.tiles[index])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// 超出邊界或空格子都回傳 None
    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.tile_at(pos).ok()?.unit.as_ref()
    }

    pub(crate) fn unit_at_mut(&mut self, pos: Position) -> Option<&mut Unit> {
        self.tile_at_mut(pos).ok()?.unit.as_mut()
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.tiles.iter().filter_map(|tile| tile.unit.as_ref())
    }

    pub(crate) fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.tiles.iter_mut().filter_map(|tile| tile.unit.as_mut())
    }

    pub fn unit_position(&self, id: UnitId) -> Option<Position> {
        self.unit_index.get(&id).copied()
    }

    pub fn unit_count(&self, faction: Faction) -> usize {
        self.units().filter(|unit| unit.faction == faction).count()
    }

    /// 指定陣營擁有的據點座標
    pub fn owned_objectives(&self, faction: Faction) -> impl Iterator<Item = Position> + '_ {
        self.tiles
            .iter()
            .filter(move |tile| {
                tile.objective
                    .as_ref()
                    .is_some_and(|objective| objective.owner == Some(faction))
            })
            .map(|tile| tile.position)
    }

    /// 變更地形，並依目錄同步據點狀態
    pub fn set_terrain(
        &mut self,
        pos: Position,
        terrain: TerrainKind,
        catalogs: &Catalogs,
    ) -> Result<&Tile> {
        let is_objective = catalogs.terrain(terrain).is_objective;
        let tile = self.tile_at_mut(pos)?;
        tile.terrain = terrain;
        match (is_objective, tile.objective.is_some()) {
            (true, false) => tile.objective = Some(Objective::default()),
            (false, true) => tile.objective = None,
            _ => {}
        }
        Ok(&*tile)
    }

    /// 設定據點擁有者；非據點地形回傳 None
    pub fn set_owner(&mut self, pos: Position, owner: Option<Faction>) -> Result<Option<&Tile>> {
        let tile = self.tile_at_mut(pos)?;
        match tile.objective.as_mut() {
            Some(objective) => {
                objective.owner = owner;
                objective.clear_progress();
                Ok(Some(&*tile))
            }
            None => Ok(None),
        }
    }

    /// 將單位放到指定位置（同步更新單位座標）
    pub fn place_unit(&mut self, pos: Position, mut unit: Unit) -> Result<&Tile> {
        if self.unit_index.contains_key(&unit.id) {
            return Err(BoardError::DuplicateUnit { id: unit.id }.into());
        }
        let index = self.index(pos)?;
        if self.tiles[index].unit.is_some() {
            return Err(BoardError::TileOccupied { pos }.into());
        }
        unit.position = pos;
        self.unit_index.insert(unit.id, pos);
        self.tiles[index].unit = Some(unit);
        Ok(&self.tiles[index])
    }

    /// 移除並回傳指定位置的單位
    pub fn remove_unit(&mut self, pos: Position) -> Result<Unit> {
        let tile = self.tile_at_mut(pos)?;
        let unit = tile.unit.take().ok_or(BoardError::NoUnitAtPos { pos })?;
        self.unit_index.remove(&unit.id);
        Ok(unit)
    }

    /// 將 from 的單位搬到 to，回傳目的地 Tile
    pub fn move_unit(&mut self, from: Position, to: Position) -> Result<&Tile> {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;
        if self.tiles[from_index].unit.is_none() {
            return Err(BoardError::NoUnitAtPos { pos: from }.into());
        }
        if self.tiles[to_index].unit.is_some() {
            return Err(BoardError::TileOccupied { pos: to }.into());
        }
        let mut unit = self.tiles[from_index]
            .unit
            .take()
            .ok_or(BoardError::NoUnitAtPos { pos: from })?;
        unit.position = to;
        self.unit_index.insert(unit.id, to);
        self.tiles[to_index].unit = Some(unit);
        Ok(&self.tiles[to_index])
    }

    /// 往指定方向移動一格後的位置，超出邊界回傳 `None`
    pub fn step_in_direction(&self, pos: Position, direction: Direction) -> Option<Position> {
        let next = match direction {
            Direction::Up => Position {
                x: pos.x,
                y: pos.y.checked_sub(1)?,
            },
            Direction::Down => Position {
                x: pos.x,
                y: pos.y + 1,
            },
            Direction::Left => Position {
                x: pos.x.checked_sub(1)?,
                y: pos.y,
            },
            Direction::Right => Position {
                x: pos.x + 1,
                y: pos.y,
            },
        };
        self.contains(next).then_some(next)
    }

    /// 上下左右四個相鄰位置（略過邊界外）
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::iter().filter_map(move |direction| self.step_in_direction(pos, direction))
    }
}

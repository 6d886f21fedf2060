//! 對局狀態

use crate::board::Board;
use crate::catalog::Catalogs;
use crate::config::{ActionEconomy, MatchConfig};
use crate::domain::alias::UnitId;
use crate::domain::core_types::{Faction, Position, UnitKind};
use crate::error::{CommandError, LoadError, Result};
use crate::generation::generate;
use crate::logic::economy::Economy;
use crate::unit::Unit;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 已選擇的單位與其可行動範圍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub pos: Position,
    pub reachable: BTreeSet<Position>,
    pub targets: BTreeSet<Position>,
}

/// 互動狀態機
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingSelection,
    UnitSelected(Selection),
    GameOver { winner: Faction },
}

/// 對局建立方式，重置時依此重建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Setup {
    Generated,
    Prepared(Board),
}

/// 一場對局的完整狀態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub(crate) config: MatchConfig,
    pub(crate) catalogs: Catalogs,
    setup: Setup,
    pub(crate) board: Board,
    /// 索引即陣營
    pub(crate) economies: Vec<Economy>,
    pub(crate) current_faction: Faction,
    /// 所有陣營各行動一次為一輪，從 1 開始
    pub(crate) turn: u32,
    pub(crate) phase: Phase,
    pub(crate) eliminated: BTreeSet<Faction>,
    next_unit_id: UnitId,
}

impl Match {
    /// 以設定的種子產生地圖並擺放初始單位
    pub fn new(config: MatchConfig, catalogs: Catalogs) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        let map = generate(
            config.width,
            config.height,
            config.faction_count,
            &config.generation,
            &catalogs,
            &mut rng,
        )?;

        let mut game = Self::assemble(config, catalogs, Setup::Generated, map.board);
        for (index, &base) in map.bases.iter().enumerate() {
            let faction = Faction(u8::try_from(index).map_err(|_| {
                LoadError::InvalidConfig(format!("陣營索引過大: {index}"))
            })?);
            game.deploy_starting_units(faction, base, &map.bases)?;
        }

        info!(
            "對局建立: {}x{} 種子 {} 陣營數 {}",
            game.config.width, game.config.height, game.config.rng_seed, game.config.faction_count
        );
        Ok(game)
    }

    /// 使用預先準備的棋盤（例如 ASCII 地圖），不擺放初始單位
    pub fn with_board(config: MatchConfig, catalogs: Catalogs, board: Board) -> Result<Self> {
        config.validate()?;
        validate_board_factions(&board, config.faction_count)?;
        let game = Self::assemble(config, catalogs, Setup::Prepared(board.clone()), board);
        info!(
            "對局建立: {}x{} 預設棋盤 陣營數 {}",
            game.board.width(),
            game.board.height(),
            game.config.faction_count
        );
        Ok(game)
    }

    fn assemble(config: MatchConfig, catalogs: Catalogs, setup: Setup, board: Board) -> Self {
        let action_points = match config.ruleset.action_economy {
            ActionEconomy::PerTurn => 0,
            ActionEconomy::ActionPoints { max_points, .. } => max_points,
        };
        let economies = (0..config.faction_count)
            .map(|_| {
                Economy::new(
                    config.starting_resources,
                    action_points,
                    config.start_timestamp,
                )
            })
            .collect();
        let next_unit_id = board.units().map(|unit| unit.id).max().unwrap_or(0) + 1;
        Self {
            config,
            catalogs,
            setup,
            board,
            economies,
            current_faction: Faction(0),
            turn: 1,
            phase: Phase::AwaitingSelection,
            eliminated: BTreeSet::new(),
            next_unit_id,
        }
    }

    /// 初始單位依距離主基地由近到遠擺放（主基地保留給購買）
    fn deploy_starting_units(
        &mut self,
        faction: Faction,
        base: Position,
        bases: &[Position],
    ) -> Result<()> {
        let mut candidates: Vec<Position> = self
            .board
            .tiles()
            .filter(|tile| tile.unit.is_none() && !bases.contains(&tile.position))
            .map(|tile| tile.position)
            .collect();
        candidates.sort_by_key(|pos| (pos.manhattan_distance(base), pos.y, pos.x));

        let kinds = self.config.starting_units.clone();
        if candidates.len() < kinds.len() {
            return Err(LoadError::InvalidConfig(format!("{faction}的初始單位沒有足夠空間")).into());
        }
        for (kind, pos) in kinds.into_iter().zip(candidates) {
            self.spawn_unit(pos, kind, faction)?;
        }
        Ok(())
    }

    /// 依原型產生新單位並放到棋盤上（不檢查遊戲規則）
    pub fn spawn_unit(&mut self, pos: Position, kind: UnitKind, faction: Faction) -> Result<UnitId> {
        self.economy(faction)
            .ok_or(CommandError::UnknownFaction { faction })?;
        let id = self.next_unit_id;
        let unit = Unit::from_archetype(id, self.catalogs.unit(kind), faction, pos);
        self.board.place_unit(pos, unit)?;
        self.next_unit_id += 1;
        Ok(id)
    }

    /// 依原始設定重新開始，遊戲結束後唯一可用的操作
    pub fn reset(&mut self) -> Result<()> {
        let fresh = match &self.setup {
            Setup::Generated => Self::new(self.config.clone(), self.catalogs.clone())?,
            Setup::Prepared(board) => {
                Self::with_board(self.config.clone(), self.catalogs.clone(), board.clone())?
            }
        };
        *self = fresh;
        Ok(())
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current_faction(&self) -> Faction {
        self.current_faction
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn economy(&self, faction: Faction) -> Option<&Economy> {
        self.economies.get(faction.index())
    }

    pub(crate) fn economy_mut(&mut self, faction: Faction) -> Result<&mut Economy> {
        self.economies
            .get_mut(faction.index())
            .ok_or_else(|| CommandError::UnknownFaction { faction }.into())
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.phase {
            Phase::UnitSelected(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<Faction> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_eliminated(&self, faction: Faction) -> bool {
        self.eliminated.contains(&faction)
    }

    /// 所有陣營（依索引排序）
    pub fn factions(&self) -> impl Iterator<Item = Faction> + '_ {
        (0..self.economies.len()).filter_map(|index| u8::try_from(index).ok().map(Faction))
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        match self.phase {
            Phase::GameOver { winner } => Err(CommandError::GameAlreadyOver { winner }.into()),
            _ => Ok(()),
        }
    }

    /// 擊毀單位後檢查淘汰與勝負，回傳勝利者
    pub(crate) fn update_elimination(&mut self) -> Option<Faction> {
        let newly_eliminated: Vec<Faction> = self
            .factions()
            .filter(|faction| !self.eliminated.contains(faction))
            .filter(|&faction| self.board.unit_count(faction) == 0)
            .collect();
        for faction in newly_eliminated {
            info!("{faction}已被淘汰");
            self.eliminated.insert(faction);
        }

        let survivors: Vec<Faction> = self
            .factions()
            .filter(|faction| !self.eliminated.contains(faction))
            .collect();
        let [winner] = survivors[..] else {
            return None;
        };
        info!("遊戲結束，勝利者: {winner}");
        self.phase = Phase::GameOver { winner };
        Some(winner)
    }
}

/// 棋盤上的單位與據點擁有者都必須是本場對局的陣營
fn validate_board_factions(board: &Board, faction_count: usize) -> Result<()> {
    for tile in board.tiles() {
        let factions = tile
            .unit
            .iter()
            .map(|unit| unit.faction)
            .chain(tile.objective.iter().flat_map(|o| o.owner.into_iter().chain(o.capturer)));
        for faction in factions {
            if faction.index() >= faction_count {
                return Err(LoadError::InvalidConfig(format!(
                    "{} 的{faction}超出陣營數 {faction_count}",
                    tile.position
                ))
                .into());
            }
        }
    }
    Ok(())
}

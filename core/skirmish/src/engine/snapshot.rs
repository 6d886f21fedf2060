//! 唯讀快照，提供給介面繪製或外部保存

use crate::board::Board;
use crate::domain::alias::{ActionPoints, Resources};
use crate::domain::core_types::{Faction, Position};
use crate::engine::state::{Match, Phase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionSnapshot {
    pub faction: Faction,
    pub resources: Resources,
    pub action_points: ActionPoints,
    pub unit_count: usize,
    pub objectives: Vec<Position>,
    pub eliminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub turn: u32,
    pub current_faction: Faction,
    pub phase: Phase,
    pub board: Board,
    pub factions: Vec<FactionSnapshot>,
}

impl Match {
    /// 目前的棋盤與各陣營經濟狀態
    pub fn visible_state(&self) -> MatchSnapshot {
        let factions = self
            .factions()
            .zip(&self.economies)
            .map(|(faction, economy)| FactionSnapshot {
                faction,
                resources: economy.resources,
                action_points: economy.action_points,
                unit_count: self.board.unit_count(faction),
                objectives: self.board.owned_objectives(faction).collect(),
                eliminated: self.is_eliminated(faction),
            })
            .collect();
        MatchSnapshot {
            turn: self.turn,
            current_faction: self.current_faction,
            phase: self.phase.clone(),
            board: self.board.clone(),
            factions,
        }
    }
}

//! 據點佔領與據點收入

use crate::board::{Board, Objective};
use crate::domain::alias::Resources;
use crate::domain::constants::{CAPTURE_COMPLETE, CAPTURE_INCREMENT};
use crate::domain::core_types::{Faction, Position};
use crate::error::CommandError;
use serde::{Deserialize, Serialize};

/// 一次佔領行動的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureProgress {
    /// 累積中
    Progressed { progress: u32 },
    /// 擁有權轉移
    Captured { previous_owner: Option<Faction> },
}

/// 累積佔領進度
///
/// - 已屬於該陣營的據點無法再佔領
/// - 換陣營佔領時，先前的進度作廢
/// - 進度達 100 時轉移擁有權並歸零
pub fn advance_capture(
    objective: &mut Objective,
    pos: Position,
    faction: Faction,
) -> Result<CaptureProgress, CommandError> {
    if objective.owner == Some(faction) {
        return Err(CommandError::AlreadyOwned { pos, faction });
    }
    if objective.capturer != Some(faction) {
        objective.capture_progress = 0;
        objective.capturer = Some(faction);
    }

    objective.capture_progress += CAPTURE_INCREMENT;
    if objective.capture_progress < CAPTURE_COMPLETE {
        return Ok(CaptureProgress::Progressed {
            progress: objective.capture_progress,
        });
    }

    let previous_owner = objective.owner.replace(faction);
    objective.clear_progress();
    Ok(CaptureProgress::Captured { previous_owner })
}

/// 單位離開或陣亡時，捨棄該格由其陣營累積的進度
pub fn abandon_capture(board: &mut Board, pos: Position, faction: Faction) {
    let Ok(tile) = board.tile_at_mut(pos) else {
        return;
    };
    if let Some(objective) = tile.objective.as_mut() {
        if objective.capturer == Some(faction) {
            objective.clear_progress();
        }
    }
}

/// 陣營依擁有的據點數量可得的收入
pub fn objective_income(board: &Board, faction: Faction, amount_per_objective: Resources) -> Resources {
    let owned = Resources::try_from(board.owned_objectives(faction).count()).unwrap_or(Resources::MAX);
    owned.saturating_mul(amount_per_objective)
}

//! 攻擊範圍計算
//!
//! 射程只看曼哈頓距離，不需要路徑搜尋，直接掃描整個棋盤。

use crate::board::Board;
use crate::catalog::{Catalogs, UnitArchetype};
use crate::domain::core_types::Position;
use std::collections::BTreeSet;

/// 距離是否落在原型射程內
pub fn in_attack_range(archetype: &UnitArchetype, from: Position, to: Position) -> bool {
    let distance = from.manhattan_distance(to);
    archetype.max_attack_range > 0
        && archetype.min_attack_range <= distance
        && distance <= archetype.max_attack_range
}

/// 單位可攻擊的格子：射程內且有敵方單位
///
/// 起點沒有單位或原型最大射程為 0 時回傳空集合。
pub fn attackable_tiles(board: &Board, catalogs: &Catalogs, from: Position) -> BTreeSet<Position> {
    let Some(attacker) = board.unit_at(from) else {
        return BTreeSet::new();
    };
    let archetype = catalogs.unit(attacker.kind);
    if archetype.max_attack_range == 0 {
        return BTreeSet::new();
    }

    board
        .units()
        .filter(|target| target.faction != attacker.faction)
        .map(|target| target.position)
        .filter(|&pos| in_attack_range(archetype, from, pos))
        .collect()
}

//! 可移動範圍計算

use crate::board::Board;
use crate::catalog::Catalogs;
use crate::domain::alias::MovementCost;
use crate::domain::constants::IMPASSABLE_MOVEMENT_COST;
use crate::domain::core_types::{Faction, Position};
use crate::error::{CommandError, Result};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

/// 可到達位置的資訊（含成本與前驅節點）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReachableInfo {
    pub cost: MovementCost,
    pub prev: Position, // 上一個位置（可能是起點）
    /// 友軍佔據的格子：可穿越但不可停留
    pub passthrough: bool,
}

/// 計算給定移動力預算內可到達的所有位置
///
/// 使用 Dijkstra 算法探索所有可到達位置，每格最多展開一次，
/// 某格可到達 ⇔ 存在一條總成本不超過預算的路徑。
///
/// # 碰撞規則：
/// - 友軍（相同 Faction）可穿越，但不可停留
/// - 敵軍（不同 Faction）不可穿越
/// - 只允許上下左右移動
///
/// 結果不包含起點；友軍佔據的格子以 `passthrough` 標記，供還原路徑使用。
/// 起點沒有單位時回傳空集合。
pub fn reachable_positions(
    board: &Board,
    catalogs: &Catalogs,
    from: Position,
    budget: MovementCost,
) -> BTreeMap<Position, ReachableInfo> {
    let Some(mover_faction) = board.unit_at(from).map(|unit| unit.faction) else {
        return BTreeMap::new();
    };

    let get_cost = |pos: Position| {
        board
            .tile_at(pos)
            .map(|tile| catalogs.terrain(tile.terrain).movement_cost)
            .unwrap_or(IMPASSABLE_MOVEMENT_COST)
    };
    let get_occupant_faction = |pos: Position| board.unit_at(pos).map(|unit| unit.faction);

    let mut dist: HashMap<Position, MovementCost> = HashMap::new();
    let mut prev: HashMap<Position, Position> = HashMap::new();
    let mut queue: BinaryHeap<Reverse<(MovementCost, Position)>> = BinaryHeap::new();

    dist.insert(from, 0);
    queue.push(Reverse((0, from)));

    while let Some(Reverse((cost, pos))) = queue.pop() {
        // 跳過過時的隊列項（已有更優路徑）
        if cost > dist.get(&pos).copied().unwrap_or(MovementCost::MAX) {
            continue;
        }

        for next_pos in board.neighbors(pos) {
            let terrain_cost = get_cost(next_pos);
            if terrain_cost == IMPASSABLE_MOVEMENT_COST {
                continue;
            }

            let new_cost = cost.saturating_add(terrain_cost);
            if new_cost > budget {
                continue;
            }

            if !is_passable(mover_faction, get_occupant_faction(next_pos)) {
                continue;
            }

            // 如果是更優路徑，更新距離和前驅
            let best_cost = dist.get(&next_pos).copied().unwrap_or(MovementCost::MAX);
            if new_cost < best_cost {
                dist.insert(next_pos, new_cost);
                prev.insert(next_pos, pos);
                queue.push(Reverse((new_cost, next_pos)));
            }
        }
    }

    dist.into_iter()
        .filter_map(|(pos, cost)| {
            if pos == from {
                return None;
            }
            let prev = prev.get(&pos).copied()?;
            Some((
                pos,
                ReachableInfo {
                    cost,
                    prev,
                    passthrough: get_occupant_faction(pos).is_some(),
                },
            ))
        })
        .collect()
}

/// 預算內可停留的格子（排除起點與有單位的位置）
pub fn reachable_tiles_within(
    board: &Board,
    catalogs: &Catalogs,
    from: Position,
    budget: MovementCost,
) -> BTreeSet<Position> {
    reachable_positions(board, catalogs, from, budget)
        .into_iter()
        .filter(|(_, info)| !info.passthrough)
        .map(|(pos, _)| pos)
        .collect()
}

/// 單位本次行動可移動到的格子（以單位原型的移動力為預算）
pub fn reachable_tiles(board: &Board, catalogs: &Catalogs, from: Position) -> BTreeSet<Position> {
    let Some(unit) = board.unit_at(from) else {
        return BTreeSet::new();
    };
    let budget = catalogs.unit(unit.kind).move_range;
    reachable_tiles_within(board, catalogs, from, budget)
}

/// 由前驅節點還原路徑（含起點與終點）
pub fn reconstruct_path(
    reachable: &BTreeMap<Position, ReachableInfo>,
    from: Position,
    to: Position,
) -> Result<Vec<Position>> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        let Some(info) = reachable.get(&current) else {
            return Err(CommandError::NotReachable { pos: to }.into());
        };
        current = info.prev;
        path.push(current);
    }
    path.reverse();
    Ok(path)
}

/// 碰撞檢測：友軍可穿越、敵軍不可穿越、無單位可通行
fn is_passable(mover_faction: Faction, occupant: Option<Faction>) -> bool {
    match occupant {
        None => true,
        Some(faction) => faction == mover_faction,
    }
}

//! 單位（可變狀態），由所在的 Tile 獨佔持有

use crate::catalog::UnitArchetype;
use crate::domain::alias::{Health, UnitId};
use crate::domain::core_types::{Faction, Position, UnitKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub faction: Faction,
    pub health: Health,
    /// 永遠等於持有此單位的 Tile 座標
    pub position: Position,
    pub has_moved: bool,
    pub has_attacked: bool,
}

impl Unit {
    /// 由原型產生滿血單位
    pub fn from_archetype(
        id: UnitId,
        archetype: &UnitArchetype,
        faction: Faction,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind: archetype.kind,
            faction,
            health: archetype.max_health,
            position,
            has_moved: false,
            has_attacked: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// 本回合移動與攻擊都已用完
    pub fn is_exhausted(&self) -> bool {
        self.has_moved && self.has_attacked
    }

    /// 新回合開始，重置行動旗標
    pub fn refresh(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
    }
}

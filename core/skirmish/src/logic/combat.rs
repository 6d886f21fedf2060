//! 傷害結算
//!
//! 兩種公式並存，由對局規則選定：
//! - 固定減傷：`攻擊 - (防禦 + 防禦 × 地形加成%)`，最低 10，不超過剩餘血量
//! - 血量縮放：`攻擊 × 攻方血量% - 防禦 × 守方血量% × (1 + 地形加成%) / 2`，最低 1

use crate::catalog::{TerrainType, UnitArchetype};
use crate::config::DamageModel;
use crate::domain::alias::Health;
use crate::domain::constants::{MIN_FLAT_DAMAGE, MIN_SCALED_DAMAGE};
use crate::unit::Unit;

/// 參與戰鬥的一方：目前狀態 + 原型數值
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub unit: &'a Unit,
    pub archetype: &'a UnitArchetype,
}

/// 計算傷害
pub fn resolve_damage(
    model: DamageModel,
    attacker: Combatant<'_>,
    defender: Combatant<'_>,
    defender_terrain: &TerrainType,
) -> Health {
    match model {
        DamageModel::FlatMitigation => flat_mitigation_damage(
            attacker.archetype.attack,
            defender.archetype.defense,
            defender_terrain.defense_bonus_pct,
            defender.unit.health,
        ),
        DamageModel::HealthScaled => health_scaled_damage(
            attacker.archetype.attack,
            attacker.unit.health,
            defender.archetype.defense,
            defender.unit.health,
            defender_terrain.defense_bonus_pct,
        ),
    }
}

fn flat_mitigation_damage(
    attack: i32,
    defense: i32,
    defense_bonus_pct: u32,
    defender_health: Health,
) -> Health {
    let bonus = i32::try_from(defense_bonus_pct).unwrap_or(i32::MAX);
    let mitigation = defense.saturating_add(defense.saturating_mul(bonus) / 100);
    attack
        .saturating_sub(mitigation)
        .max(MIN_FLAT_DAMAGE)
        .min(defender_health.max(0))
}

fn health_scaled_damage(
    attack: i32,
    attacker_health: Health,
    defense: i32,
    defender_health: Health,
    defense_bonus_pct: u32,
) -> Health {
    let power = f64::from(attack) * f64::from(attacker_health) / 100.0;
    let guard = f64::from(defense) * f64::from(defender_health) / 100.0
        * (1.0 + f64::from(defense_bonus_pct) / 100.0)
        / 2.0;
    let raw = (power - guard).floor();
    // raw 的範圍受 i32 輸入限制，轉換不會溢位
    (raw as Health).max(MIN_SCALED_DAMAGE)
}

/// 扣血，回傳是否被擊毀
pub fn apply_damage(defender: &mut Unit, damage: Health) -> bool {
    defender.health = defender.health.saturating_sub(damage).max(0);
    !defender.is_alive()
}

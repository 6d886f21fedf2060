//! 地形目錄與單位目錄
//!
//! 啟動時由 TOML 載入，之後唯讀。查詢未定義的種類屬於設定錯誤，直接 panic。

use crate::domain::alias::{Coord, Health, MovementCost, Resources};
use crate::domain::core_types::{TerrainKind, UnitKind};
use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use strum::IntoEnumIterator;

/// 內建地形資料
pub const DEFAULT_TERRAIN_TOML: &str = include_str!("../data/terrain.toml");

/// 內建單位資料
pub const DEFAULT_UNITS_TOML: &str = include_str!("../data/units.toml");

/// 地形類型定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainType {
    pub kind: TerrainKind,
    pub movement_cost: MovementCost,
    pub defense_bonus_pct: u32,
    pub is_objective: bool,
}

/// 單位原型（不可變的數值模板）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitArchetype {
    pub kind: UnitKind,
    pub max_health: Health,
    pub attack: i32,
    pub defense: i32,
    pub move_range: MovementCost,
    pub min_attack_range: Coord,
    pub max_attack_range: Coord,
    pub cost: Resources,
    /// 步兵類才能佔領據點
    #[serde(default)]
    pub can_capture: bool,
}

#[derive(Debug, Deserialize)]
struct TerrainToml {
    terrain: Vec<TerrainType>,
}

#[derive(Debug, Deserialize)]
struct UnitsToml {
    units: Vec<UnitArchetype>,
}

/// 地形與單位目錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogs {
    terrain: BTreeMap<TerrainKind, TerrainType>,
    units: BTreeMap<UnitKind, UnitArchetype>,
}

impl Catalogs {
    /// 反序列化 TOML 並驗證每個種類都有定義
    pub fn from_toml(terrain_toml: &str, units_toml: &str) -> Result<Self> {
        let parsed_terrain: TerrainToml =
            toml::from_str(terrain_toml).map_err(|e| LoadError::DeserializeError {
                format: "terrain.toml".to_string(),
                reason: e.to_string(),
            })?;

        let parsed_units: UnitsToml =
            toml::from_str(units_toml).map_err(|e| LoadError::DeserializeError {
                format: "units.toml".to_string(),
                reason: e.to_string(),
            })?;

        let terrain = parsed_terrain
            .terrain
            .into_iter()
            .map(|t| (t.kind, t))
            .collect::<BTreeMap<_, _>>();

        let units = parsed_units
            .units
            .into_iter()
            .map(|u| (u.kind, u))
            .collect::<BTreeMap<_, _>>();

        ensure_complete("terrain.toml", &terrain)?;
        ensure_complete("units.toml", &units)?;

        for archetype in units.values() {
            if archetype.min_attack_range > archetype.max_attack_range {
                return Err(LoadError::InvalidConfig(format!(
                    "{} 的最小射程 {} 大於最大射程 {}",
                    archetype.kind, archetype.min_attack_range, archetype.max_attack_range
                ))
                .into());
            }
            if archetype.max_health <= 0 {
                return Err(LoadError::InvalidConfig(format!(
                    "{} 的最大生命值必須為正數",
                    archetype.kind
                ))
                .into());
            }
        }

        Ok(Self { terrain, units })
    }

    /// 查詢地形
    ///
    /// # Panics
    /// 目錄缺少該地形時（載入時已驗證，不應發生）
    pub fn terrain(&self, kind: TerrainKind) -> &TerrainType {
        match self.terrain.get(&kind) {
            Some(t) => t,
            None => panic!("地形目錄缺少 {kind}"),
        }
    }

    /// 查詢單位原型
    ///
    /// # Panics
    /// 目錄缺少該單位時（載入時已驗證，不應發生）
    pub fn unit(&self, kind: UnitKind) -> &UnitArchetype {
        match self.units.get(&kind) {
            Some(u) => u,
            None => panic!("單位目錄缺少 {kind}"),
        }
    }

    pub fn terrain_types(&self) -> impl Iterator<Item = &TerrainType> {
        self.terrain.values()
    }

    pub fn unit_archetypes(&self) -> impl Iterator<Item = &UnitArchetype> {
        self.units.values()
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        match Self::from_toml(DEFAULT_TERRAIN_TOML, DEFAULT_UNITS_TOML) {
            Ok(catalogs) => catalogs,
            Err(e) => panic!("內建目錄資料錯誤: {e}"),
        }
    }
}

fn ensure_complete<K, V>(catalog: &str, map: &BTreeMap<K, V>) -> Result<()>
where
    K: IntoEnumIterator + Ord + Display,
{
    for kind in K::iter() {
        if !map.contains_key(&kind) {
            return Err(LoadError::MissingCatalogEntry {
                catalog: catalog.to_string(),
                entry: kind.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

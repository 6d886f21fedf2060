//! 對局設定與規則組合
//!
//! 兩套傷害公式、兩套行動經濟、兩套收入規則都是合法設計，
//! 每場對局在建立時選定一種組合，之後不可變更。

use crate::domain::alias::{ActionPoints, Coord, Resources, Timestamp};
use crate::domain::constants::{
    DEFAULT_INCOME_INTERVAL_MS, DEFAULT_MAX_ACTION_POINTS, DEFAULT_OBJECTIVE_INCOME,
    DEFAULT_RECOVERY_INTERVAL_MS, MAX_FACTIONS, MIN_FACTIONS,
};
use crate::domain::core_types::{Position, UnitKind};
use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};

/// 傷害公式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageModel {
    /// 攻擊減去（防禦 + 地形加成），最低 10，不超過剩餘血量
    #[default]
    FlatMitigation,
    /// 雙方戰力依目前血量縮放，最低 1
    HealthScaled,
}

/// 行動經濟
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionEconomy {
    /// 每個單位每回合可移動一次、攻擊一次，結束回合時輪替陣營
    #[default]
    PerTurn,
    /// 陣營共用行動點，每次移動或攻擊消耗 1 點，依時間恢復，無回合限制
    ActionPoints {
        max_points: ActionPoints,
        recovery_interval_ms: Timestamp,
    },
}

impl ActionEconomy {
    pub fn action_points() -> Self {
        Self::ActionPoints {
            max_points: DEFAULT_MAX_ACTION_POINTS,
            recovery_interval_ms: DEFAULT_RECOVERY_INTERVAL_MS,
        }
    }
}

/// 據點收入規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IncomeModel {
    /// 每個陣營回合開始時結算
    TurnStart { amount: Resources },
    /// 依外部時鐘定期結算，與回合無關
    RealTime {
        amount: Resources,
        interval_ms: Timestamp,
    },
}

impl Default for IncomeModel {
    fn default() -> Self {
        Self::TurnStart {
            amount: DEFAULT_OBJECTIVE_INCOME,
        }
    }
}

impl IncomeModel {
    pub fn real_time() -> Self {
        Self::RealTime {
            amount: DEFAULT_OBJECTIVE_INCOME,
            interval_ms: DEFAULT_INCOME_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub damage_model: DamageModel,
    pub action_economy: ActionEconomy,
    pub income_model: IncomeModel,
}

/// 隨機地圖產生參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub forest_chance: f64,
    pub mountain_chance: f64,
    pub city_chance: f64,
    /// 由邊到邊的道路條數（水平、垂直交替）
    pub road_count: usize,
    /// 道路每一步偏離主軸的機率
    pub road_drift_chance: f64,
    /// 靠近本方邊緣幾列內的據點歸屬該陣營
    pub home_rows: Coord,
    /// 各陣營主基地位置，None 則使用預設位置
    pub bases: Option<Vec<Position>>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            forest_chance: 0.15,
            mountain_chance: 0.08,
            city_chance: 0.05,
            road_count: 2,
            road_drift_chance: 0.3,
            home_rows: 2,
            bases: None,
        }
    }
}

/// 對局設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub width: Coord,
    pub height: Coord,
    pub faction_count: usize,
    pub rng_seed: u64,
    /// 對局開始時間，作為行動點恢復與即時收入的起點
    pub start_timestamp: Timestamp,
    pub starting_resources: Resources,
    /// 每個陣營的初始單位，依序擺在主基地附近
    pub starting_units: Vec<UnitKind>,
    pub ruleset: Ruleset,
    pub generation: GenerationConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            faction_count: MIN_FACTIONS,
            rng_seed: 0,
            start_timestamp: 0,
            starting_resources: 1000,
            starting_units: vec![UnitKind::Infantry, UnitKind::Infantry, UnitKind::Tank],
            ruleset: Ruleset::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl MatchConfig {
    /// 反序列化 TOML 並驗證
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: MatchConfig =
            toml::from_str(toml_str).map_err(|e| LoadError::DeserializeError {
                format: "match config".to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(LoadError::InvalidConfig(msg).into()) };

        if self.width == 0 || self.height == 0 {
            return invalid(format!("棋盤尺寸無效: {}x{}", self.width, self.height));
        }
        if !(MIN_FACTIONS..=MAX_FACTIONS).contains(&self.faction_count) {
            return invalid(format!(
                "陣營數量必須介於 {MIN_FACTIONS} 與 {MAX_FACTIONS} 之間: {}",
                self.faction_count
            ));
        }
        if self.starting_units.is_empty() {
            return invalid("每個陣營至少需要一個初始單位".to_string());
        }
        if let ActionEconomy::ActionPoints {
            max_points,
            recovery_interval_ms,
        } = self.ruleset.action_economy
        {
            if max_points == 0 || recovery_interval_ms == 0 {
                return invalid("行動點上限與恢復間隔必須為正數".to_string());
            }
        }
        if let IncomeModel::RealTime { interval_ms, .. } = self.ruleset.income_model {
            if interval_ms == 0 {
                return invalid("收入間隔必須為正數".to_string());
            }
        }

        let generation = &self.generation;
        let chances = [
            generation.forest_chance,
            generation.mountain_chance,
            generation.city_chance,
            generation.road_drift_chance,
        ];
        if chances.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return invalid("機率必須介於 0 與 1 之間".to_string());
        }
        if generation.forest_chance + generation.mountain_chance + generation.city_chance > 1.0 {
            return invalid("地形機率總和不可超過 1".to_string());
        }
        if let Some(bases) = &generation.bases {
            if bases.len() != self.faction_count {
                return invalid(format!(
                    "主基地數量 {} 與陣營數量 {} 不符",
                    bases.len(),
                    self.faction_count
                ));
            }
            if let Some(pos) = bases
                .iter()
                .find(|pos| pos.x >= self.width || pos.y >= self.height)
            {
                return invalid(format!("主基地 {pos} 超出棋盤"));
            }
            for (i, pos) in bases.iter().enumerate() {
                if bases[..i].contains(pos) {
                    return invalid(format!("主基地 {pos} 重複"));
                }
            }
        }
        Ok(())
    }
}

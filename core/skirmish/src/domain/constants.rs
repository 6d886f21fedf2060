//! 遊戲常數定義

use crate::domain::alias::{ActionPoints, Health, MovementCost, Resources, Timestamp};

/// 無法通過的移動成本
pub const IMPASSABLE_MOVEMENT_COST: MovementCost = MovementCost::MAX;

/// 每次佔領行動累積的進度
pub const CAPTURE_INCREMENT: u32 = 50;

/// 佔領完成所需進度
pub const CAPTURE_COMPLETE: u32 = 100;

/// 固定減傷公式的最低傷害
pub const MIN_FLAT_DAMAGE: Health = 10;

/// 血量縮放公式的最低傷害
pub const MIN_SCALED_DAMAGE: Health = 1;

/// 行動點上限預設值
pub const DEFAULT_MAX_ACTION_POINTS: ActionPoints = 10;

/// 行動點恢復間隔預設值（毫秒）
pub const DEFAULT_RECOVERY_INTERVAL_MS: Timestamp = 60_000;

/// 每個據點的收入預設值
pub const DEFAULT_OBJECTIVE_INCOME: Resources = 100;

/// 即時收入的結算間隔預設值（毫秒）
pub const DEFAULT_INCOME_INTERVAL_MS: Timestamp = 60_000;

/// 陣營數量下限
pub const MIN_FACTIONS: usize = 2;

/// 陣營數量上限（每個陣營對應棋盤的一條邊）
pub const MAX_FACTIONS: usize = 4;

//! 型別別名

/// 棋盤座標
pub type Coord = usize;
/// 單位唯一 ID
pub type UnitId = u64;
/// 移動成本
pub type MovementCost = u32;
/// 生命值
pub type Health = i32;
/// 陣營資源
pub type Resources = u32;
/// 行動點數
pub type ActionPoints = u32;
/// 毫秒時間戳（由外部時鐘提供）
pub type Timestamp = u64;

//! 核心規則邏輯（純函式，不持有對局狀態）

pub mod capture;
pub mod combat;
pub mod economy;
pub mod reachability;
pub mod targeting;

//! 對局引擎：狀態、指令與快照
//!
//! 所有狀態變更都經由 [`Match`] 的指令方法，指令先完整驗證再變更，
//! 驗證失敗時對局狀態不變。

pub mod command;
pub mod snapshot;
pub mod state;

pub use command::{
    AttackOutcome, CaptureOutcome, ClickOutcome, Command, CommandOutcome, DefenderState,
    MoveOutcome, PurchaseOutcome, TickOutcome, TurnOutcome,
};
pub use snapshot::{FactionSnapshot, MatchSnapshot};
pub use state::{Match, Phase, Selection};

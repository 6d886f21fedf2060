//! 錯誤處理系統
//!
//! 所有玩家操作錯誤都是可恢復的回傳值，`Display` 同時作為介面顯示的狀態訊息。
//! 只有目錄查詢失敗（靜態設定錯誤）才允許 panic。

use crate::domain::alias::{Coord, Resources, UnitId};
use crate::domain::core_types::{Faction, Position, UnitKind};
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// 棋盤結構錯誤
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BoardError {
    #[error("位置超出棋盤邊界: ({x}, {y}) 邊界 ({width}, {height})")]
    OutOfBounds {
        x: Coord,
        y: Coord,
        width: Coord,
        height: Coord,
    },
    #[error("位置 {pos} 已有單位")]
    TileOccupied { pos: Position },
    #[error("位置 {pos} 沒有單位")]
    NoUnitAtPos { pos: Position },
    #[error("單位 {id} 已存在於棋盤上")]
    DuplicateUnit { id: UnitId },
}

/// 指令驗證錯誤（遊戲規則）
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CommandError {
    #[error("位置 {pos} 沒有單位")]
    EmptyTile { pos: Position },
    #[error("位置 {pos} 不屬於{faction}")]
    NotYourUnit { pos: Position, faction: Faction },
    #[error("現在是{current}的回合，{faction}無法行動")]
    NotYourTurn { faction: Faction, current: Faction },
    #[error("位置 {pos} 的單位沒有剩餘行動")]
    NoActionsLeft { pos: Position },
    #[error("位置 {pos} 的單位本回合已執行此行動")]
    AlreadyActed { pos: Position },
    #[error("無法移動到 {pos}")]
    InvalidDestination { pos: Position },
    #[error("{pos} 超出移動範圍")]
    NotReachable { pos: Position },
    #[error("{pos} 不是可攻擊的目標")]
    InvalidTarget { pos: Position },
    #[error("{pos} 超出攻擊範圍")]
    OutOfRange { pos: Position },
    #[error("資源不足: 需要 {cost}，目前 {available}")]
    InsufficientFunds {
        cost: Resources,
        available: Resources,
    },
    #[error("{kind} 無法佔領據點")]
    NotCaptureCapable { kind: UnitKind },
    #[error("{pos} 不是據點")]
    NotAnObjective { pos: Position },
    #[error("{pos} 已屬於{faction}")]
    AlreadyOwned { pos: Position, faction: Faction },
    #[error("尚未選擇單位")]
    NoSelection,
    #[error("{faction}不在本場對局中")]
    UnknownFaction { faction: Faction },
    #[error("遊戲已結束，勝利者為{winner}")]
    GameAlreadyOver { winner: Faction },
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("解析失敗: {0}")]
    ParseError(String),
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{catalog} 缺少項目: {entry}")]
    MissingCatalogEntry { catalog: String, entry: String },
    #[error("設定錯誤: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 若為指令驗證錯誤，回傳其種類
    pub fn command(&self) -> Option<&CommandError> {
        match &self.kind {
            ErrorKind::Command(e) => Some(e),
            _ => None,
        }
    }

    /// 若為棋盤結構錯誤，回傳其種類
    pub fn board(&self) -> Option<&BoardError> {
        match &self.kind {
            ErrorKind::Board(e) => Some(e),
            _ => None,
        }
    }

    /// 給介面顯示的狀態訊息（不含 context 鏈）
    pub fn status(&self) -> String {
        self.kind.to_string()
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.context(context)),
        }
    }
}

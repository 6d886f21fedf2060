//! 回合制網格戰棋引擎
//!
//! 由外部呼叫端送出指令（選擇、移動、攻擊、佔領、購買、結束回合、時鐘），
//! 引擎驗證後變更狀態並回傳結果；繪製與輸入處理不在此 crate 內。

pub mod board;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod generation;
pub mod loader;
pub mod logic;
pub mod unit;

pub use domain::{alias, constants, core_types};

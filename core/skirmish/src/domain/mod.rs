//! 領域基本型別

pub mod alias;
pub mod constants;
pub mod core_types;

//! 棋盤載入器

use crate::board::Board;
use crate::catalog::Catalogs;
use crate::domain::core_types::{Faction, Position, TerrainKind};
use crate::error::{LoadError, Result};
use std::collections::HashMap;

/// 地形符號
fn terrain_symbol(symbol: char) -> Option<TerrainKind> {
    match symbol {
        '.' => Some(TerrainKind::Plain),
        '=' => Some(TerrainKind::Road),
        'f' => Some(TerrainKind::Forest),
        '^' => Some(TerrainKind::Mountain),
        'c' => Some(TerrainKind::City),
        'H' => Some(TerrainKind::Base),
        _ => None,
    }
}

/// 解析單一格子：地形符號，可接陣營編號表示據點擁有者（如 `c1`、`H0`）
fn parse_cell(cell: &str) -> Option<(TerrainKind, Option<Faction>)> {
    let mut chars = cell.chars();
    let terrain = terrain_symbol(chars.next()?)?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some((terrain, None));
    }
    let owner = rest.parse::<u8>().ok()?;
    Some((terrain, Some(Faction(owner))))
}

/// 從 ASCII 格式載入棋盤
///
/// ASCII 格式：每行用空格分隔的符號
/// - `.` 平原、`=` 道路、`f` 森林、`^` 山地、`c` 城市、`H` 主基地
/// - 據點符號後接數字代表擁有者，例如 `H0`、`c1`
/// - 其他字串（`A`、`E1` 等）= 平原上的標記位置，相同標記收集成 Vec
///
/// 返回：(棋盤, 標記映射)
///
/// 例如：
/// ```text
/// H0 . A
/// .  ^ .
/// E  . H1
/// ```
pub fn load_from_ascii(
    ascii: &str,
    catalogs: &Catalogs,
) -> Result<(Board, HashMap<String, Vec<Position>>)> {
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LoadError::ParseError("棋盤為空".to_string()).into());
    }

    // 推導寬度（第一行的符號數）
    let width = lines[0].split_whitespace().count();
    let height = lines.len();

    let mut board = Board::new(width, height, TerrainKind::Plain, catalogs);
    let mut markers: HashMap<String, Vec<Position>> = HashMap::new();

    for (y, line) in lines.iter().enumerate() {
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.len() != width {
            return Err(LoadError::ParseError(format!(
                "第 {y} 行寬度 {} 與第一行 {width} 不符",
                cells.len()
            ))
            .into());
        }
        for (x, cell) in cells.into_iter().enumerate() {
            let pos = Position { x, y };
            match parse_cell(cell) {
                Some((terrain, owner)) => {
                    board.set_terrain(pos, terrain, catalogs)?;
                    if owner.is_some() && board.set_owner(pos, owner)?.is_none() {
                        return Err(LoadError::ParseError(format!(
                            "{pos} 的 {terrain} 不是據點，無法指定擁有者"
                        ))
                        .into());
                    }
                }
                // 非地形符號記為標記
                None => markers.entry(cell.to_string()).or_default().push(pos),
            }
        }
    }

    Ok((board, markers))
}

//! 隨機地圖產生
//!
//! 亂數來源由呼叫端注入，相同種子必定產生相同地圖。

use crate::board::Board;
use crate::catalog::Catalogs;
use crate::config::GenerationConfig;
use crate::domain::alias::Coord;
use crate::domain::core_types::{Faction, Position, TerrainKind};
use crate::error::{LoadError, Result};
use rand::Rng;

/// 產生結果：棋盤與各陣營主基地（索引即陣營）
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub board: Board,
    pub bases: Vec<Position>,
}

/// 各陣營的本方邊緣：0 上、1 下、2 左、3 右
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeEdge {
    Top,
    Bottom,
    Left,
    Right,
}

const HOME_EDGES: [HomeEdge; 4] = [
    HomeEdge::Top,
    HomeEdge::Bottom,
    HomeEdge::Left,
    HomeEdge::Right,
];

impl HomeEdge {
    fn default_base(self, width: Coord, height: Coord) -> Position {
        match self {
            HomeEdge::Top => Position::new(width / 2, 0),
            HomeEdge::Bottom => Position::new((width - 1) / 2, height - 1),
            HomeEdge::Left => Position::new(0, height / 2),
            HomeEdge::Right => Position::new(width - 1, (height - 1) / 2),
        }
    }

    /// 是否位於本方邊緣的前 `rows` 列（行）內
    fn is_near(self, pos: Position, rows: Coord, width: Coord, height: Coord) -> bool {
        match self {
            HomeEdge::Top => pos.y < rows,
            HomeEdge::Bottom => pos.y + rows >= height,
            HomeEdge::Left => pos.x < rows,
            HomeEdge::Right => pos.x + rows >= width,
        }
    }
}

/// 產生地圖
///
/// 1. 每格以平原為底，依機率疊加城市、山地、森林
/// 2. 由邊到邊鋪設道路（偏移隨機漫步）
/// 3. 放置各陣營主基地
/// 4. 依最近邊緣分配據點初始擁有者
pub fn generate<R: Rng>(
    width: Coord,
    height: Coord,
    faction_count: usize,
    config: &GenerationConfig,
    catalogs: &Catalogs,
    rng: &mut R,
) -> Result<GeneratedMap> {
    if width == 0 || height == 0 {
        return Err(LoadError::InvalidConfig(format!("棋盤尺寸無效: {width}x{height}")).into());
    }
    if faction_count > HOME_EDGES.len() {
        return Err(LoadError::InvalidConfig(format!("陣營數量過多: {faction_count}")).into());
    }

    let mut board = Board::new(width, height, TerrainKind::Plain, catalogs);

    for y in 0..height {
        for x in 0..width {
            let terrain = roll_terrain(config, rng);
            board.set_terrain(Position { x, y }, terrain, catalogs)?;
        }
    }

    for i in 0..config.road_count {
        let horizontal = i % 2 == 0;
        for pos in carve_road(width, height, horizontal, config.road_drift_chance, rng) {
            // 道路不覆蓋城市
            if board.tile_at(pos)?.terrain != TerrainKind::City {
                board.set_terrain(pos, TerrainKind::Road, catalogs)?;
            }
        }
    }

    let bases: Vec<Position> = match &config.bases {
        Some(bases) => bases.clone(),
        None => HOME_EDGES[..faction_count]
            .iter()
            .map(|edge| edge.default_base(width, height))
            .collect(),
    };
    if bases.len() != faction_count {
        return Err(LoadError::InvalidConfig(format!(
            "主基地數量 {} 與陣營數量 {faction_count} 不符",
            bases.len()
        ))
        .into());
    }

    // 最近邊緣歸屬：依陣營順序判定，先符合者優先
    let objectives: Vec<Position> = board
        .tiles()
        .filter(|tile| tile.objective.is_some())
        .map(|tile| tile.position)
        .collect();
    for pos in objectives {
        let owner = HOME_EDGES[..faction_count]
            .iter()
            .position(|edge| edge.is_near(pos, config.home_rows, width, height))
            .and_then(|index| u8::try_from(index).ok())
            .map(Faction);
        board.set_owner(pos, owner)?;
    }

    for (index, &pos) in bases.iter().enumerate() {
        let faction = u8::try_from(index)
            .map_err(|_| LoadError::InvalidConfig(format!("陣營索引過大: {index}")))?;
        board.set_terrain(pos, TerrainKind::Base, catalogs)?;
        board.set_owner(pos, Some(Faction(faction)))?;
    }

    Ok(GeneratedMap { board, bases })
}

fn roll_terrain<R: Rng>(config: &GenerationConfig, rng: &mut R) -> TerrainKind {
    let roll: f64 = rng.random();
    let mut threshold = config.city_chance;
    if roll < threshold {
        return TerrainKind::City;
    }
    threshold += config.mountain_chance;
    if roll < threshold {
        return TerrainKind::Mountain;
    }
    threshold += config.forest_chance;
    if roll < threshold {
        return TerrainKind::Forest;
    }
    TerrainKind::Plain
}

/// 由一邊走到對邊的道路
///
/// 主軸每步前進一格，並以 `drift_chance` 機率往垂直方向偏移一格（夾在邊界內）。
/// 偏移時會先補上轉角格，確保道路四方向連續。
fn carve_road<R: Rng>(
    width: Coord,
    height: Coord,
    horizontal: bool,
    drift_chance: f64,
    rng: &mut R,
) -> Vec<Position> {
    let (length, span) = if horizontal {
        (width, height)
    } else {
        (height, width)
    };
    let to_pos = |main: Coord, cross: Coord| {
        if horizontal {
            Position::new(main, cross)
        } else {
            Position::new(cross, main)
        }
    };

    let mut cross = rng.random_range(0..span);
    let mut path = Vec::with_capacity(length * 2);
    for main in 0..length {
        path.push(to_pos(main, cross));
        if span > 1 && rng.random_bool(drift_chance) {
            let next = if cross == 0 {
                1
            } else if cross == span - 1 || rng.random_bool(0.5) {
                cross - 1
            } else {
                cross + 1
            };
            cross = next;
            path.push(to_pos(main, cross));
        }
    }
    path
}

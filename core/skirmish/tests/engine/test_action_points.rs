//! 行動點制度與即時收入

use crate::test_helpers::{build_board, marker, start_match};
use skirmish::config::{ActionEconomy, IncomeModel, MatchConfig, Ruleset};
use skirmish::core_types::{Faction, Position, UnitKind};
use skirmish::engine::Match;
use skirmish::catalog::Catalogs;
use skirmish::error::{CommandError, ErrorKind, LoadError};

const T0: u64 = 1_000;

fn action_point_match(ascii: &str) -> (Match, crate::test_helpers::Markers) {
    let (board, markers) = build_board(ascii);
    let config = MatchConfig {
        start_timestamp: T0,
        ruleset: Ruleset {
            action_economy: ActionEconomy::action_points(),
            ..Default::default()
        },
        ..Default::default()
    };
    (start_match(board, &markers, config), markers)
}

/// 在兩格之間來回移動 `times` 次，回傳最後位置
fn shuttle(game: &mut Match, start: Position, other: Position, times: usize) -> Position {
    let mut pos = start;
    for _ in 0..times {
        let next = if pos == start { other } else { start };
        game.move_unit(pos, next).unwrap();
        pos = next;
    }
    pos
}

fn points(game: &Match, faction: Faction) -> u32 {
    game.economy(faction).unwrap().action_points
}

#[test]
fn test_recovery_strict_boundary() {
    let (mut game, markers) = action_point_match("I0 . . . I1");
    let from = marker(&markers, "I0");
    assert_eq!(points(&game, Faction(0)), 10);

    shuttle(&mut game, from, Position::new(1, 0), 5);
    assert_eq!(points(&game, Faction(0)), 5);

    let outcome = game.tick(T0 + 59_999).unwrap();
    assert!(outcome.recovered.is_empty());
    assert_eq!(points(&game, Faction(0)), 5);

    let outcome = game.tick(T0 + 60_000).unwrap();
    assert_eq!(outcome.recovered, vec![(Faction(0), 1)]);
    assert_eq!(points(&game, Faction(0)), 6);
    // 滿點的陣營不累積
    assert_eq!(points(&game, Faction(1)), 10);
}

#[test]
fn test_no_turn_gate() {
    let (mut game, markers) = action_point_match("I0 . . . I1");
    let enemy = marker(&markers, "I1");
    assert_eq!(game.current_faction(), Faction(0));

    game.move_unit(enemy, Position::new(3, 0)).unwrap();
    assert_eq!(points(&game, Faction(1)), 9);
    assert_eq!(points(&game, Faction(0)), 10);
}

#[test]
fn test_points_exhausted() {
    let (mut game, markers) = action_point_match("I0 . . . I1");
    let from = marker(&markers, "I0");
    let pos = shuttle(&mut game, from, Position::new(1, 0), 10);
    assert_eq!(points(&game, Faction(0)), 0);

    let err = game.select_unit(pos).unwrap_err();
    assert_eq!(err.command(), Some(&CommandError::NoActionsLeft { pos }));
    let err = game.move_unit(pos, Position::new(2, 0)).unwrap_err();
    assert_eq!(err.command(), Some(&CommandError::NoActionsLeft { pos }));

    game.tick(T0 + 120_000).unwrap();
    assert_eq!(points(&game, Faction(0)), 2);
    assert!(game.move_unit(pos, Position::new(2, 0)).is_ok());
}

#[test]
fn test_owner_purchases_ready_unit() {
    let (mut game, _) = action_point_match("H0 . . H1");
    let base = Position::new(3, 0);
    let outcome = game.purchase_unit(base, UnitKind::Recon).unwrap();
    assert_eq!(outcome.faction, Faction(1));
    assert!(game.select_unit(base).is_ok());
}

#[test]
fn test_real_time_income() {
    let (board, markers) = build_board("H0 c0 . H1");
    let config = MatchConfig {
        ruleset: Ruleset {
            income_model: IncomeModel::real_time(),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut game = start_match(board, &markers, config);
    let start = game.economy(Faction(0)).unwrap().resources;

    assert!(game.tick(59_999).unwrap().income.is_empty());

    let outcome = game.tick(60_000).unwrap();
    assert_eq!(outcome.income, vec![(Faction(0), 200), (Faction(1), 100)]);

    let outcome = game.tick(185_000).unwrap();
    assert_eq!(outcome.income, vec![(Faction(0), 400), (Faction(1), 200)]);
    assert_eq!(game.economy(Faction(0)).unwrap().resources, start + 600);

    // 即時收入制度下回合切換不給收入
    assert_eq!(game.end_turn().unwrap().income, 0);
}

#[test]
fn test_eliminated_faction_cannot_purchase() {
    let (board, markers) = build_board("H0 T0 I1 H1 . I2");
    let config = MatchConfig {
        faction_count: 3,
        start_timestamp: T0,
        ruleset: Ruleset {
            action_economy: ActionEconomy::action_points(),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut game = start_match(board, &markers, config);
    let attacker = marker(&markers, "T0");
    let target = marker(&markers, "I1");

    game.attack(attacker, target).unwrap();
    let outcome = game.attack(attacker, target).unwrap();
    assert_eq!(outcome.winner, None);
    assert!(game.is_eliminated(Faction(1)));

    let base = Position::new(3, 0);
    let before = game.clone();
    let err = game.purchase_unit(base, UnitKind::Infantry).unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::NotYourUnit {
            pos: base,
            faction: Faction(1),
        })
    );
    assert_eq!(game, before);
}

#[test]
fn test_board_with_unknown_faction_rejected() {
    let test_data = ["H3 . I0 I1", "H0 . I0 I2"];
    for (idx, ascii) in test_data.into_iter().enumerate() {
        let (mut board, markers) = build_board(ascii);
        let catalogs = Catalogs::default();
        for (id, (name, positions)) in (1..).zip(markers.iter()) {
            let Some((kind, faction)) = crate::test_helpers::parse_unit_marker(name) else {
                continue;
            };
            let unit = skirmish::unit::Unit::from_archetype(
                id,
                catalogs.unit(kind),
                faction,
                positions[0],
            );
            board.place_unit(positions[0], unit).unwrap();
        }
        let config = MatchConfig {
            ruleset: Ruleset {
                action_economy: ActionEconomy::action_points(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = Match::with_board(config, catalogs, board).unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::Load(LoadError::InvalidConfig(_))),
            "Case {idx}"
        );
    }
}

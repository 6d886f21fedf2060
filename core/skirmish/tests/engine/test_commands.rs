//! 選擇、移動、攻擊、購買與點擊互動

use crate::test_helpers::{marker, setup_match};
use skirmish::config::Ruleset;
use skirmish::core_types::{Faction, Position, UnitKind};
use skirmish::engine::{ClickOutcome, Command, CommandOutcome, DefenderState, Phase};
use skirmish::error::{BoardError, CommandError};
use std::collections::BTreeSet;

#[test]
fn test_select_unit_errors() {
    let (mut game, _) = setup_match("I0 . I1", Ruleset::default());
    let before = game.clone();

    let test_data = [
        (
            Position::new(1, 0),
            CommandError::EmptyTile {
                pos: Position::new(1, 0),
            },
        ),
        (
            Position::new(2, 0),
            CommandError::NotYourTurn {
                faction: Faction(1),
                current: Faction(0),
            },
        ),
    ];
    for (idx, (pos, expected)) in test_data.into_iter().enumerate() {
        let err = game.select_unit(pos).unwrap_err();
        assert_eq!(err.command(), Some(&expected), "Case {idx}");
    }
    let err = game.select_unit(Position::new(9, 9)).unwrap_err();
    assert!(matches!(err.board(), Some(BoardError::OutOfBounds { .. })));
    assert_eq!(game, before, "失敗的指令不應變更狀態");

    let selection = game.select_unit(Position::new(0, 0)).unwrap();
    assert_eq!(selection.reachable, BTreeSet::from([Position::new(1, 0)]));
    assert!(selection.targets.is_empty());
    assert_eq!(game.phase(), &Phase::UnitSelected(selection));
}

#[test]
fn test_move_unit() {
    let (mut game, markers) = setup_match("I0 . . . . I1", Ruleset::default());
    let from = marker(&markers, "I0");
    let before = game.clone();

    let test_data = [
        (from, CommandError::InvalidDestination { pos: from }),
        (
            Position::new(5, 0),
            CommandError::InvalidDestination {
                pos: Position::new(5, 0),
            },
        ),
        (
            Position::new(4, 0),
            CommandError::NotReachable {
                pos: Position::new(4, 0),
            },
        ),
    ];
    for (idx, (to, expected)) in test_data.into_iter().enumerate() {
        let err = game.move_unit(from, to).unwrap_err();
        assert_eq!(err.command(), Some(&expected), "Case {idx}");
    }
    assert_eq!(game, before, "失敗的指令不應變更狀態");

    let to = Position::new(3, 0);
    let outcome = game.move_unit(from, to).unwrap();
    assert_eq!(outcome.cost, 3);
    assert_eq!(
        outcome.path,
        (0..4).map(|x| Position::new(x, 0)).collect::<Vec<_>>()
    );
    assert!(game.board().unit_at(from).is_none());
    assert_eq!(game.board().unit_at(to).unwrap().kind, UnitKind::Infantry);

    let err = game.move_unit(to, Position::new(2, 0)).unwrap_err();
    assert_eq!(err.command(), Some(&CommandError::AlreadyActed { pos: to }));

    // 移動後仍可選擇，但只剩攻擊
    let selection = game.select_unit(to).unwrap();
    assert!(selection.reachable.is_empty());
}

#[test]
fn test_attack() {
    let (mut game, _) = setup_match("I0 I1 I0 . X1", Ruleset::default());
    let attacker = Position::new(0, 0);
    let before = game.clone();

    let test_data = [
        (
            Position::new(2, 0),
            CommandError::InvalidTarget {
                pos: Position::new(2, 0),
            },
        ),
        (
            Position::new(3, 0),
            CommandError::InvalidTarget {
                pos: Position::new(3, 0),
            },
        ),
        (
            Position::new(4, 0),
            CommandError::OutOfRange {
                pos: Position::new(4, 0),
            },
        ),
    ];
    for (idx, (target, expected)) in test_data.into_iter().enumerate() {
        let err = game.attack(attacker, target).unwrap_err();
        assert_eq!(err.command(), Some(&expected), "Case {idx}");
    }
    assert_eq!(game, before, "失敗的指令不應變更狀態");

    let target = Position::new(1, 0);
    let outcome = game.attack(attacker, target).unwrap();
    assert_eq!(outcome.damage, 45);
    assert_eq!(outcome.defender, DefenderState::Remaining(55));
    assert_eq!(outcome.winner, None);
    assert_eq!(game.board().unit_at(attacker).unwrap().position, attacker);
    assert!(game.board().unit_at(attacker).unwrap().has_attacked);

    let err = game.attack(attacker, target).unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::AlreadyActed { pos: attacker })
    );

    // 攻擊 + 移動後行動用盡
    let second = Position::new(2, 0);
    game.attack(second, target).unwrap();
    game.move_unit(second, Position::new(3, 0)).unwrap();
    let exhausted = Position::new(3, 0);
    let err = game.select_unit(exhausted).unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::NoActionsLeft { pos: exhausted })
    );
    assert_eq!(game.board().unit_at(target).unwrap().health, 10);
}

#[test]
fn test_purchase_unit() {
    let (mut game, _) = setup_match("H0 c0 c0 . c1 H1", Ruleset::default());
    let start = game.economy(Faction(0)).unwrap().resources;

    let outcome = game
        .purchase_unit(Position::new(0, 0), UnitKind::Infantry)
        .unwrap();
    assert_eq!(outcome.faction, Faction(0));
    assert_eq!(outcome.remaining, start - 100);
    let unit = game.board().unit_at(Position::new(0, 0)).unwrap();
    assert_eq!(unit.id, outcome.unit_id);
    assert_eq!(unit.faction, Faction(0));

    let err = game
        .purchase_unit(Position::new(0, 0), UnitKind::Infantry)
        .unwrap_err();
    assert_eq!(
        err.board(),
        Some(&BoardError::TileOccupied {
            pos: Position::new(0, 0)
        })
    );

    let test_data = [
        (
            Position::new(5, 0),
            CommandError::NotYourUnit {
                pos: Position::new(5, 0),
                faction: Faction(0),
            },
        ),
        (
            Position::new(4, 0),
            CommandError::NotYourUnit {
                pos: Position::new(4, 0),
                faction: Faction(0),
            },
        ),
        (
            Position::new(3, 0),
            CommandError::NotAnObjective {
                pos: Position::new(3, 0),
            },
        ),
    ];
    for (idx, (pos, expected)) in test_data.into_iter().enumerate() {
        let err = game.purchase_unit(pos, UnitKind::Infantry).unwrap_err();
        assert_eq!(err.command(), Some(&expected), "Case {idx}");
    }

    let outcome = game
        .purchase_unit(Position::new(1, 0), UnitKind::Tank)
        .unwrap();
    assert_eq!(outcome.remaining, start - 800);
    let before = game.clone();
    let err = game
        .purchase_unit(Position::new(2, 0), UnitKind::Tank)
        .unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::InsufficientFunds {
            cost: 700,
            available: start - 800
        })
    );
    assert_eq!(game, before, "失敗的指令不應變更狀態");

    // 新單位下個回合才能行動
    let err = game.select_unit(Position::new(0, 0)).unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::NoActionsLeft {
            pos: Position::new(0, 0)
        })
    );
    game.end_turn().unwrap();
    game.end_turn().unwrap();
    assert!(game.select_unit(Position::new(0, 0)).is_ok());
}

#[test]
fn test_click_flow() {
    let ascii = r#"
I0 . .
.  . I1
    "#;
    let (mut game, markers) = setup_match(ascii, Ruleset::default());
    let from = marker(&markers, "I0");
    let enemy = marker(&markers, "I1");

    let ClickOutcome::Selected(selection) = game.click(from).unwrap() else {
        panic!("應選擇單位");
    };
    let expected = BTreeSet::from([
        Position::new(1, 0),
        Position::new(2, 0),
        Position::new(0, 1),
        Position::new(1, 1),
    ]);
    assert_eq!(selection.reachable, expected);
    assert!(selection.targets.is_empty());

    let to = Position::new(1, 1);
    let ClickOutcome::Moved(outcome) = game.click(to).unwrap() else {
        panic!("應移動單位");
    };
    assert_eq!(outcome.path.len(), 3);
    assert_eq!(outcome.path.first(), Some(&from));
    assert_eq!(outcome.path.last(), Some(&to));
    assert_eq!(game.phase(), &Phase::AwaitingSelection);

    let ClickOutcome::Selected(selection) = game.click(to).unwrap() else {
        panic!("應選擇單位");
    };
    assert!(selection.reachable.is_empty());
    assert_eq!(selection.targets, BTreeSet::from([enemy]));

    // 點擊無效格子取消選擇
    assert_eq!(game.click(from).unwrap(), ClickOutcome::Cancelled);
    assert_eq!(game.phase(), &Phase::AwaitingSelection);

    game.click(to).unwrap();
    let ClickOutcome::Attacked(outcome) = game.click(enemy).unwrap() else {
        panic!("應攻擊目標");
    };
    assert_eq!(outcome.defender, DefenderState::Remaining(55));

    let err = game.click(enemy).unwrap_err();
    assert_eq!(
        err.command(),
        Some(&CommandError::NotYourTurn {
            faction: Faction(1),
            current: Faction(0),
        })
    );
}

#[test]
fn test_click_switches_selection() {
    let (mut game, _) = setup_match("I0 . I0", Ruleset::default());
    game.click(Position::new(0, 0)).unwrap();
    let ClickOutcome::Selected(selection) = game.click(Position::new(2, 0)).unwrap() else {
        panic!("應改選單位");
    };
    assert_eq!(selection.pos, Position::new(2, 0));
    assert_eq!(game.selection(), Some(&selection));
}

#[test]
fn test_click_enemy_out_of_range_cancels() {
    let (mut game, markers) = setup_match("I0 . . . I1", Ruleset::default());
    let from = marker(&markers, "I0");
    let enemy = marker(&markers, "I1");

    let ClickOutcome::Selected(selection) = game.click(from).unwrap() else {
        panic!("應選擇單位");
    };
    assert!(!selection.reachable.contains(&enemy));
    assert!(!selection.targets.contains(&enemy));

    assert_eq!(game.click(enemy).unwrap(), ClickOutcome::Cancelled);
    assert_eq!(game.phase(), &Phase::AwaitingSelection);
    assert!(game.board().unit_at(from).is_some());
}

#[test]
fn test_apply_commands_in_order() {
    let (mut game, _) = setup_match("I0 . . I1", Ruleset::default());
    let commands = [
        Command::Select {
            pos: Position::new(0, 0),
        },
        Command::Move {
            from: Position::new(0, 0),
            to: Position::new(2, 0),
        },
        Command::Attack {
            attacker: Position::new(2, 0),
            target: Position::new(3, 0),
        },
        Command::EndTurn,
    ];
    let outcomes: Vec<CommandOutcome> = commands
        .into_iter()
        .map(|command| game.apply(command).unwrap())
        .collect();

    assert!(matches!(outcomes[0], CommandOutcome::Selected(_)));
    assert!(matches!(outcomes[1], CommandOutcome::Moved(_)));
    let CommandOutcome::Attacked(attack) = &outcomes[2] else {
        panic!("應為攻擊結果");
    };
    assert_eq!(attack.damage, 45);
    assert_eq!(outcomes[2].to_string(), "對 (3, 0) 造成 45 傷害，剩餘血量 55");
    assert_eq!(game.current_faction(), Faction(1));

    let err = game.apply(Command::Cancel).map(|outcome| outcome.to_string());
    assert_eq!(err.unwrap(), "已取消選擇");
}

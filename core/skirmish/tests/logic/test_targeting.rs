//! 攻擊範圍測試

use crate::test_helpers::{marker, setup_match};
use skirmish::config::Ruleset;
use skirmish::core_types::Position;
use skirmish::logic::targeting::attackable_tiles;
use std::collections::BTreeSet;

#[test]
fn test_artillery_min_max_range() {
    let ascii = r#"
.  . .  . .  . .
I1 . .  . .  . .
.  . A0 . R0 . .
.  . I1 . .  . .
.  . I1 . .  . .
.  . .  . .  . .
.  . T1 . .  . .
    "#;
    let (game, markers) = setup_match(ascii, Ruleset::default());
    let from = marker(&markers, "A0");
    assert_eq!(from, Position::new(2, 2));

    let result = attackable_tiles(game.board(), game.catalogs(), from);
    // (2,3) 距離 1、(2,6) 距離 4 都不在 2..=3 內；友軍 (4,2) 不可攻擊
    let expected = BTreeSet::from([Position::new(0, 1), Position::new(2, 4)]);
    assert_eq!(result, expected);
}

#[test]
fn test_adjacent_only_for_direct_units() {
    let test_data = [
        ("I0 I1 .", vec![(1, 0)]),
        ("I0 . I1", vec![]),
        ("T0 I1 I1", vec![(1, 0)]),
        // 運輸車最大射程 0
        ("X0 I1 .", vec![]),
        ("I0 I0 .", vec![]),
    ];
    for (idx, (ascii, expected)) in test_data.iter().enumerate() {
        let (game, _) = setup_match(ascii, Ruleset::default());
        let result = attackable_tiles(game.board(), game.catalogs(), Position::new(0, 0));
        let expected: BTreeSet<Position> =
            expected.iter().map(|&(x, y)| Position::new(x, y)).collect();
        assert_eq!(result, expected, "Case {idx}");
    }
}

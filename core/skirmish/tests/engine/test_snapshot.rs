//! 快照與序列化

use crate::test_helpers::setup_match;
use skirmish::config::{MatchConfig, Ruleset};
use skirmish::core_types::{Faction, Position};
use skirmish::engine::{Command, Match, MatchSnapshot};

#[test]
fn test_visible_state() {
    let (mut game, _) = setup_match("H0 I0 . c1 H1 I1", Ruleset::default());
    game.select_unit(Position::new(1, 0)).unwrap();

    let snapshot = game.visible_state();
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.current_faction, Faction(0));
    assert_eq!(snapshot.phase, *game.phase());
    assert_eq!(snapshot.board, *game.board());
    assert_eq!(snapshot.factions.len(), 2);

    let first = &snapshot.factions[0];
    assert_eq!(first.faction, Faction(0));
    assert_eq!(first.unit_count, 1);
    assert_eq!(first.objectives, vec![Position::new(0, 0)]);
    assert!(!first.eliminated);

    let second = &snapshot.factions[1];
    assert_eq!(
        second.objectives,
        vec![Position::new(3, 0), Position::new(4, 0)]
    );
}

#[test]
fn test_snapshot_serde_json() {
    let (game, _) = setup_match("H0 I0 . c1 H1 I1", Ruleset::default());
    let snapshot = game.visible_state();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: MatchSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, snapshot);
}

#[test]
fn test_match_serde_json_resumes() {
    let config = MatchConfig {
        rng_seed: 3,
        ..Default::default()
    };
    let mut game = Match::new(config, Default::default()).unwrap();
    game.end_turn().unwrap();

    let json = serde_json::to_string(&game).unwrap();
    let mut restored: Match = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.visible_state(), game.visible_state());

    let expected = game.apply(Command::EndTurn).unwrap();
    let actual = restored.apply(Command::EndTurn).unwrap();
    assert_eq!(actual, expected);
    assert_eq!(restored.visible_state(), game.visible_state());
}

//! Resolve tests - swaps, specials, damage and the revert law

use kombat_krush::core::{
    find_matches, Board, Encounter, EncounterConfig, EngineEvent, IterationReport, Phase,
};
use kombat_krush::types::{PieceKind, PieceState, Pos, SpecialKind};

// Move-rich layout with a Kano four waiting at row 2 behind a swap of
// (2,3) and (3,3)
const FOUR: [&str; 8] = [
    "ZRPKLTMY", "RPKLTMYZ", "KRKZKKMY", "RPZKTMYZ", "ZRPKLTMY", "RPKLTMYZ", "ZRPKLTMY",
    "RPKLTMYZ",
];

// Same, but the swap only completes a three
const THREE: [&str; 8] = [
    "ZRPKLTMY", "RPKLTMYZ", "KRKZKLMY", "RPZKTMYZ", "ZRPKLTMY", "RPKLTMYZ", "ZRPKLTMY",
    "RPKLTMYZ",
];

// Kano column at (2,1), (3,1) and (5,1); swapping (4,2) into (4,1) makes four
const COLUMN_FOUR: [&str; 8] = [
    "ZRPKLTMY", "RPKLTMYZ", "PKLTMYZR", "KKTMYZRP", "LTKYZRPK", "TKYZRPKL", "MYZRPKLT",
    "YZRPKLTM",
];

// Kano row K K _ K K at row 4 with the gap filled from (5,3). The Kanos at
// (3,2) and (3,4) fall beside the gap once the run is cleared.
const ROW_FIVE: [&str; 8] = [
    "ZRPKLTMY", "RPKLTMYZ", "PKLTMYZR", "KLKMKZRP", "LKKYKKPK", "TMYKRPKL", "MYZRPKLT",
    "YZRPKLTM",
];

fn start_on(character: PieceKind, board: Board) -> Encounter {
    Encounter::start(EncounterConfig {
        character,
        seed: 11,
        board: Some(board),
        ..EncounterConfig::default()
    })
    .unwrap()
}

fn iterations(events: &[EngineEvent]) -> Vec<IterationReport> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Iteration(report) => Some(report.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_preset_boards_are_quiet() {
    assert!(find_matches(&Board::from_rows(&FOUR).unwrap()).is_empty());
    assert!(find_matches(&Board::from_rows(&THREE).unwrap()).is_empty());
    assert!(find_matches(&Board::from_rows(&COLUMN_FOUR).unwrap()).is_empty());
    assert!(find_matches(&Board::from_rows(&ROW_FIVE).unwrap()).is_empty());
}

#[test]
fn test_four_run_deals_four_and_leaves_row_clear() {
    let mut enc = start_on(PieceKind::SubZero, Board::from_rows(&FOUR).unwrap());
    enc.submit_swap(Pos::new(2, 3), Pos::new(3, 3)).unwrap();

    assert_eq!(enc.advance().unwrap(), Some(Phase::Swapped));
    assert_eq!(enc.advance().unwrap(), Some(Phase::Cleared));

    // The new special stays on the board while the rest of the run is marked
    let created = enc.board().get(Pos::new(2, 3)).unwrap();
    assert_eq!(created.special, SpecialKind::RowClear);
    assert_eq!(created.state, PieceState::Idle);
    for col in [2, 4, 5] {
        assert_eq!(enc.board().get(Pos::new(2, col)).unwrap().state, PieceState::Matched);
    }

    enc.run_to_settle().unwrap();
    let reports = iterations(&enc.take_events());
    let first = &reports[0];
    assert_eq!(first.combo, 1);
    assert_eq!(first.cleared_count, 4);
    assert_eq!(first.damage_dealt, 4);
    let special = first.special_created.unwrap();
    assert_eq!((special.pos, special.kind), (Pos::new(2, 3), SpecialKind::RowClear));
}

#[test]
fn test_vertical_four_leaves_column_clear() {
    let mut enc = start_on(PieceKind::SubZero, Board::from_rows(&COLUMN_FOUR).unwrap());
    enc.submit_swap(Pos::new(4, 2), Pos::new(4, 1)).unwrap();

    assert_eq!(enc.advance().unwrap(), Some(Phase::Swapped));
    assert_eq!(enc.advance().unwrap(), Some(Phase::Cleared));
    let created = enc.board().get(Pos::new(4, 1)).unwrap();
    assert_eq!(created.special, SpecialKind::ColClear);
    assert_eq!(created.kind, Some(PieceKind::Kano));

    enc.run_to_settle().unwrap();
    let reports = iterations(&enc.take_events());
    let first = &reports[0];
    assert_eq!(first.cleared_count, 4);
    assert_eq!(first.damage_dealt, 4);
    let special = first.special_created.unwrap();
    assert_eq!((special.pos, special.kind), (Pos::new(4, 1), SpecialKind::ColClear));
}

#[test]
fn test_five_run_dragon_fires_on_the_next_iteration() {
    let mut enc = start_on(PieceKind::SubZero, Board::from_rows(&ROW_FIVE).unwrap());
    enc.submit_swap(Pos::new(5, 3), Pos::new(4, 3)).unwrap();

    assert_eq!(enc.advance().unwrap(), Some(Phase::Swapped));
    assert_eq!(enc.advance().unwrap(), Some(Phase::Cleared));
    assert_eq!(enc.board().get(Pos::new(4, 3)).unwrap().special, SpecialKind::Dragon);

    enc.run_to_settle().unwrap();
    let reports = iterations(&enc.take_events());
    assert!(reports.len() >= 2);

    let first = &reports[0];
    assert_eq!(first.cleared_count, 5);
    assert_eq!(first.damage_dealt, 5);
    let special = first.special_created.unwrap();
    assert_eq!((special.pos, special.kind), (Pos::new(4, 3), SpecialKind::Dragon));

    // Gravity lines the dragon up with the Kanos that fell beside it
    let second = &reports[1];
    assert_eq!(second.combo, 2);
    let dragon = second
        .specials_activated
        .iter()
        .find(|a| a.kind == SpecialKind::Dragon)
        .unwrap();
    assert_eq!(dragon.pos, Pos::new(4, 3));
    assert!(dragon.target.is_some());
    // At least three pieces plus the activation bonus, doubled by the combo
    assert!(second.damage_dealt >= (3 + 15) * 2);
}

#[test]
fn test_own_kind_pieces_hit_harder() {
    let mut enc = start_on(PieceKind::Kano, Board::from_rows(&FOUR).unwrap());
    enc.submit_swap(Pos::new(2, 3), Pos::new(3, 3)).unwrap();
    enc.run_to_settle().unwrap();
    let reports = iterations(&enc.take_events());
    assert_eq!(reports[0].damage_dealt, 6);
}

#[test]
fn test_row_clear_in_a_match_sweeps_the_row() {
    let mut board = Board::from_rows(&THREE).unwrap();
    board.set_special(Pos::new(2, 4), SpecialKind::RowClear);
    let mut enc = start_on(PieceKind::SubZero, board);
    enc.submit_swap(Pos::new(2, 3), Pos::new(3, 3)).unwrap();
    enc.run_to_settle().unwrap();

    let reports = iterations(&enc.take_events());
    let first = &reports[0];
    // Eight pieces at 1.0 plus the activation bonus
    assert_eq!(first.cleared_count, 8);
    assert_eq!(first.damage_dealt, 8 + 15);
    assert_eq!(first.specials_activated.len(), 1);
    assert_eq!(first.specials_activated[0].kind, SpecialKind::RowClear);
    assert!(first.special_created.is_none());
}

#[test]
fn test_swap_without_match_is_reverted() {
    let board = Board::from_rows(&FOUR).unwrap();
    let mut enc = start_on(PieceKind::SubZero, board.clone());
    let countdown = enc.combat().moves_until_attack;
    let health = enc.combat().opponent_health;

    enc.submit_swap(Pos::new(7, 6), Pos::new(7, 7)).unwrap();
    let phases = enc.run_to_settle().unwrap();

    assert_eq!(phases, vec![Phase::Swapped, Phase::Reverted, Phase::Settled]);
    assert!(enc.board().same_layout(&board));
    assert_eq!(enc.board().get(Pos::new(7, 6)).unwrap().id, board.get(Pos::new(7, 6)).unwrap().id);
    assert_eq!(enc.combat().moves_until_attack, countdown);
    assert_eq!(enc.combat().opponent_health, health);

    let events = enc.take_events();
    assert!(matches!(events[0], EngineEvent::SwapApplied { .. }));
    assert!(matches!(events[1], EngineEvent::SwapReverted { .. }));
    assert_eq!(events.len(), 2);
}

#[test]
fn test_combo_climbs_by_one_per_iteration() {
    let mut enc = Encounter::start(EncounterConfig {
        seed: 2024,
        non_lethal: true,
        ..EncounterConfig::default()
    })
    .unwrap();

    for _ in 0..40 {
        if !enc.status().is_playing() {
            break;
        }
        let (a, b) = enc.request_hint().unwrap();
        let from = enc.board().find_id(a).unwrap();
        let to = enc.board().find_id(b).unwrap();
        enc.submit_swap(from, to).unwrap();
        enc.run_to_settle().unwrap();

        let reports = iterations(&enc.take_events());
        assert!(!reports.is_empty());
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.combo, i as u32 + 1);
            assert!(report.cleared_count >= 3);
        }
        assert!(enc.combat().max_combo >= reports.len() as u32);
        assert_eq!(enc.combat().combo, 1);

        // Settled boards are full, quiet and playable
        assert_eq!(enc.board().empty_count(), 0);
        assert!(find_matches(enc.board()).is_empty());
        assert!(enc.request_hint().is_some() || !enc.status().is_playing());
    }
}

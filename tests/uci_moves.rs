use cozy_chess::Color;

use castellan::board::{find_uci, Position};

#[test]
fn apply_startpos_moves_sequence() {
    let moves = vec!["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()];
    let pos = Position::set_from_start_and_moves(&moves).expect("legal move sequence");
    assert_eq!(
        pos.side_to_move(),
        Color::Black,
        "expected black to move after 3 plies"
    );
    assert_eq!(pos.key_history().len(), 4, "start plus one key per move");
}

#[test]
fn illegal_move_is_rejected_and_position_unchanged() {
    let mut pos = Position::startpos();
    let before = pos.board().hash();
    assert!(pos.play_uci("e2e5").is_err(), "pawn cannot jump three ranks");
    assert_eq!(pos.board().hash(), before, "failed move must not mutate");
}

#[test]
fn promotion_moves_parse() {
    let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").expect("valid fen");
    let mv = find_uci(pos.board(), "a7a8q").expect("promotion is legal");
    assert_eq!(format!("{mv}"), "a7a8q");
}

#[test]
fn garbage_move_text_is_rejected() {
    let pos = Position::startpos();
    assert!(find_uci(pos.board(), "zz99").is_none());
    assert!(find_uci(pos.board(), "").is_none());
}

#[test]
fn fen_with_wrong_field_count_is_rejected() {
    assert!(Position::from_fen("only two fields").is_err());
}

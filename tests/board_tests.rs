//! Board tests - initializer invariants over many seeds and alphabets

use proptest::prelude::*;

use memory_game::core::{Board, BoardError, GameRng};
use memory_game::types::{CardKind, CardState, BOARD_LEN};

#[test]
fn test_standard_board_layout() {
    let board = Board::standard(&mut GameRng::new(2024));
    assert_eq!(board.len(), BOARD_LEN);
    assert_eq!(board.pair_count(), 8);
    for kind in CardKind::ALL {
        assert_eq!(board.count_of(kind), 2, "{:?}", kind);
    }
    assert!(board.iter().all(|c| c.state() == CardState::FaceDown));
}

#[test]
fn test_same_seed_same_layout() {
    let a = Board::standard(&mut GameRng::new(99));
    let b = Board::standard(&mut GameRng::new(99));
    assert_eq!(a, b);
}

#[test]
fn test_seeds_produce_different_layouts() {
    let first = Board::standard(&mut GameRng::new(1));
    let differing = (2..20)
        .map(|seed| Board::standard(&mut GameRng::new(seed)))
        .filter(|b| *b != first)
        .count();
    assert!(differing > 0);
}

#[test]
fn test_shuffled_rejects_bad_configuration() {
    let mut rng = GameRng::new(1);

    assert_eq!(
        Board::shuffled(&[], 0, &mut rng).unwrap_err(),
        BoardError::EmptyAlphabet
    );
    assert_eq!(
        Board::shuffled(&[CardKind::Guy], 3, &mut rng).unwrap_err(),
        BoardError::OddLength(3)
    );
    assert_eq!(
        Board::shuffled(&[CardKind::Guy], 4, &mut rng).unwrap_err(),
        BoardError::LengthMismatch { len: 4, kinds: 1 }
    );
    assert_eq!(
        Board::shuffled(&[CardKind::Guy, CardKind::Guy], 4, &mut rng).unwrap_err(),
        BoardError::DuplicateKind("guy")
    );
}

#[test]
fn test_board_error_messages() {
    let err = BoardError::LengthMismatch { len: 6, kinds: 2 };
    assert_eq!(
        err.to_string(),
        "board length 6 cannot hold two cards of each of 2 kinds"
    );
    assert_eq!(BoardError::EmptyAlphabet.to_string(), "card alphabet is empty");
}

#[test]
fn test_from_kinds_requires_pairs() {
    use CardKind::{Potato, Rocket};

    assert!(Board::from_kinds(&[Rocket, Potato, Potato, Rocket]).is_ok());
    assert_eq!(
        Board::from_kinds(&[Rocket, Rocket, Rocket, Rocket]).unwrap_err(),
        BoardError::UnpairedKind {
            kind: "rocket",
            count: 4
        }
    );
    assert_eq!(
        Board::from_kinds(&[Rocket, Rocket, Potato]).unwrap_err(),
        BoardError::OddLength(3)
    );
}

#[test]
fn test_kinds_in_first_appearance_order() {
    use CardKind::{Kronos, Unicorn};
    let board = Board::from_kinds(&[Unicorn, Kronos, Kronos, Unicorn]).unwrap();
    assert_eq!(board.kinds(), vec![Unicorn, Kronos]);
}

proptest! {
    #[test]
    fn every_kind_appears_exactly_twice(seed in any::<u64>(), kinds in 1usize..=8) {
        let alphabet = &CardKind::ALL[..kinds];
        let board = Board::shuffled(alphabet, kinds * 2, &mut GameRng::new(seed)).unwrap();

        prop_assert_eq!(board.len(), kinds * 2);
        for &kind in alphabet {
            prop_assert_eq!(board.count_of(kind), 2);
        }
        prop_assert!(board.iter().all(|c| alphabet.contains(&c.kind())));
        prop_assert!(board.iter().all(|c| c.state() == CardState::FaceDown));
    }

    #[test]
    fn wrong_length_is_always_rejected(kinds in 1usize..=8, len in 0usize..40) {
        prop_assume!(len != kinds * 2);
        let result = Board::shuffled(&CardKind::ALL[..kinds], len, &mut GameRng::new(7));
        prop_assert!(result.is_err());
    }
}

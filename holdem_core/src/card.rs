use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// --- Card model ---

/// Suit
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
}

/// Rank, valued 2..=14. Ace is always high except in the 5-high straight.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// A single playing card. Cards are immutable values; comparisons between
/// cards for hand strength always go through `rank`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

/// Hand category, weakest first so the derived `Ord` ranks them.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum HandRank {
    HighCard = 1,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandRank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "One Pair",
            HandRank::TwoPair => "Two Pair",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
            HandRank::RoyalFlush => "Royal Flush",
        }
    }
}

/// The evaluated strength of a hand.
///
/// Two scores compare by category first, then by `tiebreaker` element by
/// element (most significant first). A shorter tie-break sequence loses on an
/// equal prefix. `best_five` is informational and takes no part in
/// comparison or equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandScore {
    pub rank: HandRank,
    pub tiebreaker: Vec<u8>,
    pub best_five: Vec<Card>,
}

impl HandScore {
    pub fn new(rank: HandRank, tiebreaker: Vec<u8>, best_five: Vec<Card>) -> HandScore {
        HandScore { rank, tiebreaker, best_five }
    }
}

impl PartialEq for HandScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HandScore {}

impl PartialOrd for HandScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.tiebreaker.cmp(&other.tiebreaker))
    }
}

// --- Display ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Suit::Spade => '♠',
            Suit::Heart => '♥',
            Suit::Club => '♣',
            Suit::Diamond => '♦',
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const FACES: [char; 5] = ['T', 'J', 'Q', 'K', 'A'];
        match self.value() {
            v @ 2..=9 => write!(f, "{v}"),
            v => write!(f, "{}", FACES[usize::from(v - 10)]),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - tiebreaker={:?}", self.rank, self.tiebreaker)
    }
}

// --- Hand evaluation ---

/// Scores the best hand available in `cards` (normally 2 hole + up to 5
/// community cards).
///
/// Checks run in priority order and the first match wins: flush family
/// (royal / straight flush / flush), then straight, then the grouped ranks
/// (quads, full house, trips, two pair, pair, high card).
///
/// # Errors
/// `GameError::InsufficientCards` if fewer than 5 cards are given.
pub fn evaluate_hand(cards: &[Card]) -> GameResult<HandScore> {
    if cards.len() < 5 {
        return Err(GameError::InsufficientCards { given: cards.len() });
    }

    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| b.rank.cmp(&a.rank));

    if let Some(score) = check_flush(&sorted) {
        return Ok(score);
    }
    if let Some(score) = check_straight(&sorted) {
        return Ok(score);
    }
    Ok(check_groups(&sorted))
}

/// `sorted` must be ordered by rank, highest first.
fn check_flush(sorted: &[Card]) -> Option<HandScore> {
    Suit::ALL
        .iter()
        .filter_map(|&suit| {
            let suited: Vec<Card> = sorted.iter().filter(|c| c.suit == suit).copied().collect();
            if suited.len() < 5 {
                return None;
            }

            if let Some(straight) = check_straight(&suited) {
                let rank = if straight.tiebreaker[0] == Rank::Ace.value() {
                    HandRank::RoyalFlush
                } else {
                    HandRank::StraightFlush
                };
                return Some(HandScore { rank, ..straight });
            }

            let best_five = suited[..5].to_vec();
            let tiebreaker = best_five.iter().map(|c| c.rank.value()).collect();
            Some(HandScore::new(HandRank::Flush, tiebreaker, best_five))
        })
        .max()
}

/// Looks for five consecutive distinct ranks, highest run first. The only
/// tie-break is the top rank of the run. A-2-3-4-5 counts, with 5 on top.
fn check_straight(sorted: &[Card]) -> Option<HandScore> {
    let mut distinct = sorted.to_vec();
    distinct.dedup_by_key(|c| c.rank);

    // strictly descending, so a spread of 4 means consecutive
    if let Some(run) = distinct
        .windows(5)
        .find(|w| w[0].rank.value() - w[4].rank.value() == 4)
    {
        return Some(HandScore::new(
            HandRank::Straight,
            vec![run[0].rank.value()],
            run.to_vec(),
        ));
    }

    let ace = *distinct.first().filter(|c| c.rank == Rank::Ace)?;
    let low = distinct.get(distinct.len().checked_sub(4)?..)?;
    let wheel = [Rank::Five, Rank::Four, Rank::Three, Rank::Two];
    if distinct.len() >= 5 && low.iter().map(|c| c.rank).eq(wheel) {
        let mut best_five = low.to_vec();
        best_five.push(ace);
        return Some(HandScore::new(HandRank::Straight, vec![Rank::Five.value()], best_five));
    }
    None
}

fn check_groups(sorted: &[Card]) -> HandScore {
    let mut counts: BTreeMap<Rank, usize> = BTreeMap::new();
    for card in sorted {
        *counts.entry(card.rank).or_insert(0) += 1;
    }

    let mut quads = Vec::new();
    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    // highest rank first
    for (&rank, &count) in counts.iter().rev() {
        match count {
            4 => quads.push(rank),
            3 => trips.push(rank),
            2 => pairs.push(rank),
            _ => {}
        }
    }

    if let Some(&quad) = quads.first() {
        return grouped(HandRank::FourOfAKind, sorted, &[(quad, 4)], 1);
    }

    if let Some(&trip) = trips.first() {
        // a second set of trips plays as the pair
        let pair = trips.get(1).copied().into_iter().chain(pairs.first().copied()).max();
        if let Some(pair) = pair {
            return grouped(HandRank::FullHouse, sorted, &[(trip, 3), (pair, 2)], 0);
        }
        return grouped(HandRank::ThreeOfAKind, sorted, &[(trip, 3)], 2);
    }

    match pairs.as_slice() {
        [high, low, ..] => grouped(HandRank::TwoPair, sorted, &[(*high, 2), (*low, 2)], 1),
        [pair] => grouped(HandRank::OnePair, sorted, &[(*pair, 2)], 3),
        [] => grouped(HandRank::HighCard, sorted, &[], 5),
    }
}

/// Builds a score from the category-defining groups followed by `kickers`
/// cards. Kickers are the highest remaining cards whose rank is not used
/// by any group; a rank can repeat only as often as it has cards.
fn grouped(rank: HandRank, sorted: &[Card], groups: &[(Rank, usize)], kickers: usize) -> HandScore {
    let mut tiebreaker = Vec::with_capacity(groups.len() + kickers);
    let mut best_five = Vec::with_capacity(5);

    for &(group_rank, size) in groups {
        tiebreaker.push(group_rank.value());
        best_five.extend(sorted.iter().filter(|c| c.rank == group_rank).take(size));
    }

    let used: Vec<Rank> = groups.iter().map(|&(r, _)| r).collect();
    for card in sorted.iter().filter(|c| !used.contains(&c.rank)).take(kickers) {
        tiebreaker.push(card.rank.value());
        best_five.push(*card);
    }

    HandScore::new(rank, tiebreaker, best_five)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;
    use Suit::*;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    fn eval(cards: &[Card]) -> HandScore {
        evaluate_hand(cards).unwrap()
    }

    fn royal_flush() -> Vec<Card> {
        vec![card(Ace, Spade), card(King, Spade), card(Queen, Spade), card(Jack, Spade),
             card(Ten, Spade), card(Two, Heart), card(Three, Diamond)]
    }

    fn straight_flush() -> Vec<Card> {
        vec![card(Nine, Heart), card(Eight, Heart), card(Seven, Heart), card(Six, Heart),
             card(Five, Heart), card(Ace, Club), card(King, Club)]
    }

    fn four_of_a_kind() -> Vec<Card> {
        vec![card(Nine, Spade), card(Nine, Heart), card(Nine, Diamond), card(Nine, Club),
             card(Ace, Spade), card(Two, Heart), card(Three, Diamond)]
    }

    fn full_house() -> Vec<Card> {
        vec![card(King, Spade), card(King, Heart), card(King, Diamond), card(Seven, Club),
             card(Seven, Spade), card(Two, Heart), card(Three, Diamond)]
    }

    fn flush() -> Vec<Card> {
        vec![card(Ace, Club), card(Jack, Club), card(Nine, Club), card(Four, Club),
             card(Two, Club), card(King, Heart), card(Queen, Diamond)]
    }

    fn straight() -> Vec<Card> {
        vec![card(Five, Spade), card(Six, Heart), card(Seven, Diamond), card(Eight, Club),
             card(Nine, Spade), card(Ace, Heart), card(Two, Diamond)]
    }

    fn three_of_a_kind() -> Vec<Card> {
        vec![card(Queen, Spade), card(Queen, Heart), card(Queen, Diamond), card(Two, Club),
             card(Four, Spade), card(Six, Heart), card(Eight, Diamond)]
    }

    fn two_pair() -> Vec<Card> {
        vec![card(Jack, Spade), card(Jack, Heart), card(Ten, Diamond), card(Ten, Club),
             card(Ace, Spade), card(Two, Heart), card(Three, Diamond)]
    }

    fn one_pair() -> Vec<Card> {
        vec![card(Two, Spade), card(Two, Heart), card(Four, Diamond), card(Five, Club),
             card(Nine, Spade), card(Jack, Heart), card(King, Diamond)]
    }

    fn high_card() -> Vec<Card> {
        vec![card(Ace, Spade), card(Queen, Heart), card(Nine, Diamond), card(Seven, Club),
             card(Five, Spade), card(Three, Heart), card(Two, Diamond)]
    }

    #[test]
    fn test_each_category() {
        assert_eq!(eval(&royal_flush()).rank, HandRank::RoyalFlush);
        assert_eq!(eval(&straight_flush()).rank, HandRank::StraightFlush);
        assert_eq!(eval(&four_of_a_kind()).rank, HandRank::FourOfAKind);
        assert_eq!(eval(&full_house()).rank, HandRank::FullHouse);
        assert_eq!(eval(&flush()).rank, HandRank::Flush);
        assert_eq!(eval(&straight()).rank, HandRank::Straight);
        assert_eq!(eval(&three_of_a_kind()).rank, HandRank::ThreeOfAKind);
        assert_eq!(eval(&two_pair()).rank, HandRank::TwoPair);
        assert_eq!(eval(&one_pair()).rank, HandRank::OnePair);
        assert_eq!(eval(&high_card()).rank, HandRank::HighCard);
    }

    #[test]
    fn test_category_ordering_pairwise() {
        let ladder: Vec<HandScore> = [
            royal_flush(), straight_flush(), four_of_a_kind(), full_house(), flush(),
            straight(), three_of_a_kind(), two_pair(), one_pair(), high_card(),
        ]
        .iter()
        .map(|cards| eval(cards))
        .collect();

        for (i, stronger) in ladder.iter().enumerate() {
            for weaker in &ladder[i + 1..] {
                assert!(stronger > weaker, "{} should beat {}", stronger, weaker);
            }
        }
    }

    #[test]
    fn test_tiebreakers() {
        assert_eq!(eval(&straight_flush()).tiebreaker, vec![9]);
        assert_eq!(eval(&four_of_a_kind()).tiebreaker, vec![9, 14]);
        assert_eq!(eval(&full_house()).tiebreaker, vec![13, 7]);
        assert_eq!(eval(&flush()).tiebreaker, vec![14, 11, 9, 4, 2]);
        assert_eq!(eval(&straight()).tiebreaker, vec![9]);
        assert_eq!(eval(&three_of_a_kind()).tiebreaker, vec![12, 8, 6]);
        assert_eq!(eval(&two_pair()).tiebreaker, vec![11, 10, 14]);
        assert_eq!(eval(&one_pair()).tiebreaker, vec![2, 13, 11, 9]);
        assert_eq!(eval(&high_card()).tiebreaker, vec![14, 12, 9, 7, 5]);
    }

    #[test]
    fn test_best_five_always_five_cards() {
        for cards in [royal_flush(), four_of_a_kind(), full_house(), straight(), two_pair(), high_card()] {
            assert_eq!(eval(&cards).best_five.len(), 5);
        }
    }

    #[test]
    fn test_insufficient_cards() {
        let cards = [card(Ace, Spade), card(King, Spade), card(Queen, Spade), card(Jack, Spade)];
        assert_eq!(evaluate_hand(&cards), Err(GameError::InsufficientCards { given: 4 }));
    }

    #[test]
    fn test_five_card_hand() {
        let cards = [card(Ten, Spade), card(Nine, Heart), card(Eight, Diamond), card(Seven, Club), card(Six, Spade)];
        assert_eq!(eval(&cards), HandScore::new(HandRank::Straight, vec![10], vec![]));
    }

    #[test]
    fn test_flush_beats_straight_in_same_seven() {
        let cards = [card(Nine, Heart), card(Eight, Heart), card(Seven, Club), card(Six, Heart),
                     card(Five, Spade), card(Two, Heart), card(King, Heart)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::Flush);
        assert_eq!(score.tiebreaker, vec![13, 9, 8, 6, 2]);
    }

    #[test]
    fn test_straight_uses_highest_run() {
        let cards = [card(Four, Club), card(Five, Heart), card(Six, Diamond), card(Seven, Spade),
                     card(Eight, Club), card(Nine, Heart), card(Ten, Spade)];
        assert_eq!(eval(&cards).tiebreaker, vec![10]);
    }

    #[test]
    fn test_straight_with_paired_board() {
        let cards = [card(Six, Club), card(Six, Heart), card(Seven, Diamond), card(Eight, Spade),
                     card(Nine, Club), card(Ten, Heart), card(Two, Spade)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::Straight);
        assert_eq!(score.tiebreaker, vec![10]);
    }

    #[test]
    fn test_wheel_straight() {
        let cards = [card(Ace, Club), card(Two, Heart), card(Three, Diamond), card(Four, Spade),
                     card(Five, Club), card(King, Heart), card(Nine, Spade)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::Straight);
        assert_eq!(score.tiebreaker, vec![5]);
        assert_eq!(score.best_five.last(), Some(&card(Ace, Club)));

        // the wheel is the lowest straight
        assert!(eval(&straight()) > score);
    }

    #[test]
    fn test_wheel_straight_flush_is_not_royal() {
        let cards = [card(Ace, Heart), card(Two, Heart), card(Three, Heart), card(Four, Heart),
                     card(Five, Heart), card(King, Club), card(Nine, Spade)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::StraightFlush);
        assert_eq!(score.tiebreaker, vec![5]);
    }

    #[test]
    fn test_two_trips_make_full_house() {
        let cards = [card(Ten, Spade), card(Ten, Heart), card(Ten, Diamond), card(Four, Club),
                     card(Four, Spade), card(Four, Heart), card(Ace, Diamond)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::FullHouse);
        assert_eq!(score.tiebreaker, vec![10, 4]);
    }

    #[test]
    fn test_three_pairs_kicker_from_third_pair() {
        let cards = [card(King, Spade), card(King, Heart), card(Nine, Diamond), card(Nine, Club),
                     card(Queen, Spade), card(Queen, Heart), card(Two, Diamond)];
        let score = eval(&cards);
        assert_eq!(score.rank, HandRank::TwoPair);
        assert_eq!(score.tiebreaker, vec![13, 12, 9]);
    }

    #[test]
    fn test_quads_kicker_can_come_from_pair() {
        let cards = [card(Five, Spade), card(Five, Heart), card(Five, Diamond), card(Five, Club),
                     card(Jack, Spade), card(Jack, Heart), card(Three, Diamond)];
        assert_eq!(eval(&cards).tiebreaker, vec![5, 11]);
    }

    #[test]
    fn test_kicker_decides_equal_pairs() {
        let board = [card(Ace, Spade), card(Ace, Heart), card(Nine, Diamond), card(Six, Club), card(Two, Spade)];
        let mut with_king = board.to_vec();
        with_king.extend([card(King, Club), card(Three, Heart)]);
        let mut with_queen = board.to_vec();
        with_queen.extend([card(Queen, Club), card(Three, Diamond)]);

        assert!(eval(&with_king) > eval(&with_queen));
    }

    #[test]
    fn test_identical_strength_is_a_tie() {
        let board = [card(Ace, Spade), card(King, Heart), card(Queen, Diamond), card(Jack, Club), card(Ten, Spade)];
        let mut a = board.to_vec();
        a.extend([card(Two, Club), card(Three, Heart)]);
        let mut b = board.to_vec();
        b.extend([card(Four, Club), card(Six, Heart)]);

        assert_eq!(eval(&a).cmp(&eval(&b)), Ordering::Equal);
    }

    #[test]
    fn test_shorter_tiebreaker_loses_on_equal_prefix() {
        let short = HandScore::new(HandRank::Straight, vec![9], vec![]);
        let long = HandScore::new(HandRank::Straight, vec![9, 2], vec![]);
        assert!(long > short);
    }

    #[test]
    fn test_display() {
        assert_eq!(card(Ten, Heart).to_string(), "♥T");
        assert_eq!(card(Two, Spade).to_string(), "♠2");
        assert_eq!(card(Ace, Diamond).to_string(), "♦A");
        assert_eq!(HandRank::FullHouse.to_string(), "Full House");
    }
}

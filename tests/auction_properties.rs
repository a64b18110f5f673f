use std::collections::BTreeMap;

use proptest::prelude::*;

use auctioneer::engine::{AuctionCore, CoreOptions, RoundResponse, RoundStart, RoundVerdict};
use auctioneer::types::{Amount, BidderId};

/// One bidder's behaviour in one round, relative to the bid at that time.
#[derive(Debug, Clone)]
enum Move {
    Offer(Amount),
    Pass,
    Withdraw,
    Garbage,
    Silent,
    HangUp,
}

impl Move {
    fn response(&self, current_bid: Amount) -> RoundResponse {
        match self {
            Move::Offer(delta) => RoundResponse::Offer(current_bid + delta),
            Move::Pass => RoundResponse::Pass,
            Move::Withdraw => RoundResponse::Withdrawn,
            Move::Garbage => RoundResponse::Malformed("??".to_string()),
            Move::Silent => RoundResponse::TimedOut,
            Move::HangUp => RoundResponse::Disconnected,
        }
    }
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop_oneof![
        6 => (0u64..40).prop_map(Move::Offer),
        3 => Just(Move::Pass),
        1 => Just(Move::Withdraw),
        1 => Just(Move::Garbage),
        1 => Just(Move::Silent),
        1 => Just(Move::HangUp),
    ]
}

fn auction_strategy() -> impl Strategy<Value = (usize, Amount, Vec<Vec<Move>>, bool)> {
    (1usize..6).prop_flat_map(|bidders| {
        (
            Just(bidders),
            1u64..20,
            proptest::collection::vec(proptest::collection::vec(move_strategy(), bidders), 0..25),
            any::<bool>(),
        )
    })
}

proptest! {
    #[test]
    fn bids_only_rise_by_at_least_the_increment(
        (bidders, increment, rounds, leader_may_raise) in auction_strategy()
    ) {
        let options = CoreOptions { leader_may_raise, max_rounds: None };
        let mut core = AuctionCore::new(100, increment, 0..bidders, options);
        let mut script = rounds.into_iter();
        let mut raises = 0u32;

        let outcome = loop {
            let snapshot = match core.begin_round() {
                RoundStart::Open(snapshot) => snapshot,
                RoundStart::Closed(outcome) => break outcome,
            };
            core.broadcast_complete();

            let before = core.state().clone();
            prop_assert_eq!(snapshot.current_bid, before.current_bid);
            prop_assert!(snapshot.recipients.iter().all(|id| before.active.contains(id)));

            // Once the script runs out, everybody passes.
            let moves = script.next().unwrap_or_default();
            let responses: BTreeMap<BidderId, RoundResponse> = snapshot
                .recipients
                .iter()
                .map(|&id| {
                    let response = moves
                        .get(id)
                        .map(|m| m.response(before.current_bid))
                        .unwrap_or(RoundResponse::Pass);
                    (id, response)
                })
                .collect();

            match core.evaluate(responses) {
                RoundVerdict::Raised { bidder, amount } => {
                    raises += 1;
                    prop_assert!(amount >= before.current_bid + increment);
                    prop_assert_eq!(core.state().current_bid, amount);
                    prop_assert_eq!(core.state().leading_bidder, Some(bidder));
                    prop_assert!(core.is_active(bidder));
                    if !leader_may_raise {
                        prop_assert_ne!(before.leading_bidder, Some(bidder));
                    }
                }
                RoundVerdict::Closed(outcome) => break outcome,
            }

            prop_assert!(core.state().current_bid >= before.current_bid);
            prop_assert!(core.state().active.is_subset(&before.active));
        };

        prop_assert!(outcome.final_bid >= 100);
        prop_assert_eq!(outcome.winner.is_some(), outcome.final_bid > 100);
        prop_assert!(outcome.rounds >= raises);
        prop_assert_eq!(core.outcome(), Some(&outcome));
    }
}

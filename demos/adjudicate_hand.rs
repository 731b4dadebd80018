//! Walks a 3-seat hand end to end: players sign receipts, the referee
//! resolves turn order, and the pot is settled at showdown.
//!
//! Run with: cargo run --example adjudicate_hand

use poker_referee::{
    Address, NativeEvaluator, ReceiptCache, ReceiptKind, ReceiptSigner, Seat, Street,
    calc_distribution,
    table::lineup::{is_betting_done, whos_turn},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let alice = ReceiptSigner::from_bytes(&[1; 32])?;
    let bob = ReceiptSigner::from_bytes(&[2; 32])?;
    let carol = ReceiptSigner::from_bytes(&[3; 32])?;
    println!("alice: {}", alice.address());
    println!("bob:   {}", bob.address());
    println!("carol: {}", carol.address());

    let cache = ReceiptCache::new();
    let hand_id = 1;
    let dealer = 0;
    let bb = 100;

    // Preflop: blinds posted, carol (the big blind) raised, the others
    // called.
    let lineup = vec![
        Seat::taken(alice.address())
            .with_last(alice.sign_action(ReceiptKind::Bet, hand_id, 300)?)
            .with_cards([12, 25]),
        Seat::taken(bob.address())
            .with_last(bob.sign_action(ReceiptKind::Bet, hand_id, 300)?)
            .with_cards([0, 16]),
        Seat::taken(carol.address())
            .with_last(carol.sign_action(ReceiptKind::Bet, hand_id, 300)?)
            .with_cards([1, 18]),
    ];
    println!(
        "preflop betting done: {}",
        is_betting_done(&lineup, &cache, dealer, Street::Preflop, Some(bb))?
    );

    // The flop comes; bob checks and it is carol's turn.
    let lineup = vec![
        lineup[0].clone(),
        Seat {
            last: Some(bob.sign_action(ReceiptKind::CheckFlop, hand_id, 300)?),
            ..lineup[1].clone()
        },
        lineup[2].clone(),
    ];
    let turn = whos_turn(&lineup, &cache, dealer, Street::Flop, Some(bb))?;
    println!("after bob checks the flop, seat {turn} is up");

    // Skip ahead: everyone shows down for their full contribution.
    let lineup = vec![
        Seat {
            last: Some(alice.sign_action(ReceiptKind::Show, hand_id, 300)?),
            ..lineup[0].clone()
        },
        Seat {
            last: Some(bob.sign_action(ReceiptKind::Show, hand_id, 300)?),
            ..lineup[1].clone()
        },
        Seat {
            last: Some(carol.sign_action(ReceiptKind::Show, hand_id, 300)?),
            ..lineup[2].clone()
        },
    ];
    let board = [30, 44, 7, 21, 49];
    let rake_address = Address::new([9; 20]);
    let distribution = calc_distribution(
        &lineup,
        &cache,
        Street::Showdown,
        &board,
        10,
        rake_address,
        &NativeEvaluator,
    )?;
    println!("payouts:");
    for (address, amount) in &distribution {
        println!("  {address} <- {amount}");
    }
    Ok(())
}

//! Side-pot construction and rake-adjusted payout.
//!
//! Pots are built fresh per call from the unequal contributions in a
//! lineup snapshot, resolved through a [`HandEvaluator`], and settled into
//! a single address-to-chips map. Total paid out always equals total
//! contributed; flooring remainders accrue to the rake address.

use crate::eval::{Card, HandEvaluator, RankedHand};
use crate::receipt::{ReceiptCache, ReceiptKind};

use super::{
    entities::{Address, Chips, Distribution, Pot, Seat, SeatIndex, Sitout, Street},
    errors::TableError,
    lineup,
};

/// One seat's claim on the pots: its position, whether it can still win,
/// and how much it put in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Stake {
    pos: SeatIndex,
    eligible: bool,
    amount: Chips,
}

/// Classify every contributing seat. At showdown only seats that revealed
/// (or mucked) a hand can win; earlier, any seat still active or all-in
/// can.
fn stakes(
    lineup: &[Seat],
    cache: &ReceiptCache,
    street: Street,
) -> Result<Vec<Stake>, TableError> {
    let mut stakes = Vec::new();
    for (pos, seat) in lineup.iter().enumerate() {
        let Some(receipt) = lineup::last_receipt(seat, cache)? else {
            continue;
        };
        let Some(amount) = receipt.amount() else {
            continue;
        };
        let eligible = if street == Street::Showdown {
            matches!(receipt.kind(), ReceiptKind::Show | ReceiptKind::Muck)
        } else {
            lineup::is_active(seat, cache, street)? || seat.sitout == Some(Sitout::AllIn)
        };
        stakes.push(Stake {
            pos,
            eligible,
            amount,
        });
    }
    Ok(stakes)
}

/// Build side pots from the distinct contribution levels. Every positive
/// contribution is a boundary level, so each seat's money lands in pots it
/// fully covered plus nothing beyond its own stack.
fn build_pots(stakes: &[Stake]) -> Vec<Pot> {
    let mut levels: Vec<Chips> = stakes
        .iter()
        .filter(|stake| stake.amount > 0)
        .map(|stake| stake.amount)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for level in levels {
        let mut size = 0;
        let mut challengers = Vec::new();
        for stake in stakes {
            size += stake.amount.min(level).saturating_sub(prev);
            if stake.eligible && stake.amount >= level {
                challengers.push(stake.pos);
            }
        }
        pots.push(Pot {
            limit: level,
            size,
            challengers,
            winners: Vec::new(),
        });
        prev = level;
    }
    pots
}

/// Rank a seat's best 7-card hand from its hole cards plus the board.
fn rank_seat<E: HandEvaluator>(
    seat: &Seat,
    pos: SeatIndex,
    board: &[u8],
    evaluator: &E,
) -> Result<RankedHand, TableError> {
    let hole = seat.cards.ok_or_else(|| {
        TableError::InvalidParams(format!("seat {pos} contests a pot without hole cards"))
    })?;
    if board.len() != 5 {
        return Err(TableError::InvalidParams(format!(
            "board must hold 5 cards to rank hands, got {}",
            board.len()
        )));
    }
    let mut cards = Vec::with_capacity(7);
    for idx in hole.iter().chain(board.iter()) {
        cards.push(Card::from_index(*idx).ok_or_else(|| {
            TableError::InvalidParams(format!("card index {idx} out of range"))
        })?);
    }
    let cards: [Card; 7] = cards
        .try_into()
        .map_err(|_| TableError::InvalidParams("expected exactly 7 cards".into()))?;
    Ok(evaluator.solve(&cards))
}

/// Settle a hand: build side pots, resolve each pot's winners, and fold
/// the payouts into one map. `rake_per_mille` is the house cut in parts
/// per thousand; the rake address also absorbs flooring remainders and
/// pots nobody can claim.
pub fn calc_distribution<E: HandEvaluator>(
    lineup: &[Seat],
    cache: &ReceiptCache,
    street: Street,
    board: &[u8],
    rake_per_mille: Chips,
    rake_address: Address,
    evaluator: &E,
) -> Result<Distribution, TableError> {
    if lineup.len() < 2 {
        return Err(TableError::InvalidParams(format!(
            "lineup needs at least 2 seats, got {}",
            lineup.len()
        )));
    }
    if rake_per_mille > 1000 {
        return Err(TableError::InvalidParams(format!(
            "rake of {rake_per_mille} per mille exceeds the pot"
        )));
    }
    let stakes = stakes(lineup, cache, street)?;
    // Receipt amounts are attacker controlled. A checked grand total bounds
    // every pot size, payout, and rake computed below, so the per-pot
    // arithmetic cannot wrap.
    let mut total: Chips = 0;
    for stake in &stakes {
        total = total.checked_add(stake.amount).ok_or_else(|| {
            TableError::InvalidParams("total contributions overflow".into())
        })?;
    }
    let mut pots = build_pots(&stakes);

    // Hands are ranked at most once per seat even when it contests
    // several pots.
    let mut ranked: Vec<Option<RankedHand>> = vec![None; lineup.len()];
    let mut rank_of = |pos: SeatIndex| -> Result<RankedHand, TableError> {
        if let Some(hand) = &ranked[pos] {
            return Ok(hand.clone());
        }
        let hand = rank_seat(&lineup[pos], pos, board, evaluator)?;
        ranked[pos] = Some(hand.clone());
        Ok(hand)
    };

    let mut distribution = Distribution::new();
    let mut house = 0;
    for pot in &mut pots {
        match pot.challengers.len() {
            0 => {
                // Nobody can claim this pot; the house keeps it.
                house += pot.size;
                continue;
            }
            1 => pot.winners = pot.challengers.clone(),
            _ => {
                let mut hands = Vec::with_capacity(pot.challengers.len());
                for &pos in &pot.challengers {
                    hands.push(rank_of(pos)?);
                }
                // The evaluator is a public seam; its output is validated
                // like any other input.
                let best = evaluator.winners(&hands);
                if best.is_empty() {
                    return Err(TableError::InvalidParams(
                        "evaluator returned no winners for a contested pot".into(),
                    ));
                }
                pot.winners = best
                    .into_iter()
                    .map(|idx| {
                        pot.challengers.get(idx).copied().ok_or_else(|| {
                            TableError::InvalidParams(format!(
                                "evaluator winner index {idx} out of range"
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
        }
        let rake = (u128::from(pot.size) * u128::from(rake_per_mille) / 1000) as Chips;
        let share = (pot.size - rake) / pot.winners.len() as Chips;
        let mut paid = 0;
        for &pos in &pot.winners {
            paid += share;
            if share > 0 {
                *distribution.entry(lineup[pos].address).or_insert(0) += share;
            }
        }
        house += pot.size - paid;
        log::debug!(
            "pot at level {} worth {} split {} ways, {} to the house",
            pot.limit,
            pot.size,
            pot.winners.len(),
            pot.size - paid
        );
    }
    if house > 0 {
        *distribution.entry(rake_address).or_insert(0) += house;
    }
    Ok(distribution)
}

//! Turn, blind, and betting-round resolution over a lineup snapshot.
//!
//! Every function here is a pure computation over the caller's lineup, the
//! current street, and a dealer index, dereferencing each seat's last
//! receipt through a [`ReceiptCache`]. Index arithmetic is modular, so
//! positions wrap around the table.

use std::sync::Arc;

use crate::receipt::{Receipt, ReceiptCache, ReceiptKind};

use super::{
    entities::{Chips, MaxBet, Seat, SeatIndex, Sitout, Street},
    errors::TableError,
};

/// Validate the lineup/dealer preconditions shared by every operation that
/// reasons about blinds or turn order.
pub fn check_args(lineup: &[Seat], dealer: SeatIndex) -> Result<(), TableError> {
    if lineup.len() < 2 {
        return Err(TableError::InvalidParams(format!(
            "lineup needs at least 2 seats, got {}",
            lineup.len()
        )));
    }
    if dealer >= lineup.len() {
        return Err(TableError::InvalidParams(format!(
            "dealer index {dealer} out of range for {} seats",
            lineup.len()
        )));
    }
    Ok(())
}

/// Dereference a seat's most recent receipt through the cache.
pub(crate) fn last_receipt(
    seat: &Seat,
    cache: &ReceiptCache,
) -> Result<Option<Arc<Receipt>>, TableError> {
    match &seat.last {
        Some(encoded) => Ok(cache.get(encoded)?),
        None => Ok(None),
    }
}

/// The seat's most recent contribution, if its last receipt carries one.
fn contribution(seat: &Seat, cache: &ReceiptCache) -> Result<Option<Chips>, TableError> {
    Ok(last_receipt(seat, cache)?.and_then(|receipt| receipt.amount()))
}

/// Whether a seat still has actions to take on the given street.
///
/// An all-in seat is only "active" at showdown, where it must still reveal
/// or muck; on earlier streets it cannot act and is skipped (the live money
/// is accounted for by the hand-completion rule instead).
pub fn is_active(seat: &Seat, cache: &ReceiptCache, street: Street) -> Result<bool, TableError> {
    if street == Street::Showdown && seat.sitout == Some(Sitout::AllIn) {
        return Ok(true);
    }
    if seat.sitout.is_some() || seat.address.is_empty() {
        return Ok(false);
    }
    let Some(receipt) = last_receipt(seat, cache)? else {
        // A seat that has not acted yet is only live before cards go out.
        return Ok(street <= Street::Dealing);
    };
    let active = match receipt.kind() {
        ReceiptKind::Fold | ReceiptKind::Show => false,
        ReceiptKind::SitOut => receipt.amount() == Some(0),
        _ => true,
    };
    Ok(active)
}

/// Circular scan for the first active position at or after `from`.
pub fn next_active(
    lineup: &[Seat],
    cache: &ReceiptCache,
    street: Street,
    from: SeatIndex,
) -> Result<SeatIndex, TableError> {
    for offset in 0..lineup.len() {
        let pos = (from + offset) % lineup.len();
        if is_active(&lineup[pos], cache, street)? {
            return Ok(pos);
        }
    }
    Err(TableError::NoActivePlayer)
}

/// Every active position in table order, starting one past the dealer.
/// An empty result means no seat is active; that is a legitimate state,
/// not an error.
pub fn active_positions(
    lineup: &[Seat],
    cache: &ReceiptCache,
    street: Street,
    dealer: SeatIndex,
) -> Result<Vec<SeatIndex>, TableError> {
    let start = match next_active(lineup, cache, street, (dealer + 1) % lineup.len()) {
        Ok(pos) => pos,
        Err(TableError::NoActivePlayer) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut positions = Vec::new();
    for offset in 0..lineup.len() {
        let pos = (start + offset) % lineup.len();
        if is_active(&lineup[pos], cache, street)? {
            positions.push(pos);
        }
    }
    Ok(positions)
}

/// Whether a seat takes part in blind-position arithmetic: occupied, not
/// sat out (all-in still counts), and either the hand has not started or
/// the seat has already acted.
#[must_use]
pub fn was_involved(seat: &Seat, street: Street) -> bool {
    !seat.address.is_empty()
        && matches!(seat.sitout, None | Some(Sitout::AllIn))
        && (street <= Street::Dealing || seat.last.is_some())
}

fn next_involved(lineup: &[Seat], street: Street, from: SeatIndex) -> Result<SeatIndex, TableError> {
    for offset in 0..lineup.len() {
        let pos = (from + offset) % lineup.len();
        if was_involved(&lineup[pos], street) {
            return Ok(pos);
        }
    }
    Err(TableError::NoActivePlayer)
}

fn involved_count(lineup: &[Seat], street: Street) -> usize {
    lineup
        .iter()
        .filter(|seat| was_involved(seat, street))
        .count()
}

/// The small blind: the involved seat after the dealer, except heads-up
/// where the dealer posts it.
pub fn sb_pos(
    lineup: &[Seat],
    street: Street,
    dealer: SeatIndex,
) -> Result<SeatIndex, TableError> {
    check_args(lineup, dealer)?;
    if involved_count(lineup, street) == 2 {
        return Ok(dealer);
    }
    next_involved(lineup, street, (dealer + 1) % lineup.len())
}

/// The big blind: the involved seat after the small blind.
pub fn bb_pos(
    lineup: &[Seat],
    street: Street,
    dealer: SeatIndex,
) -> Result<SeatIndex, TableError> {
    let sb = sb_pos(lineup, street, dealer)?;
    next_involved(lineup, street, (sb + 1) % lineup.len())
}

/// The highest last-receipt contribution among `positions`, scanned in the
/// given order. A later seat matching the running maximum takes it over, so
/// the returned position is the *most recent* maximum bettor; a zero amount
/// is a valid maximum (it identifies the first actor when blinds are still
/// being posted).
pub fn max_bet(
    lineup: &[Seat],
    cache: &ReceiptCache,
    positions: &[SeatIndex],
) -> Result<MaxBet, TableError> {
    let mut best: Option<MaxBet> = None;
    for &pos in positions {
        if let Some(amount) = contribution(&lineup[pos], cache)? {
            if best.is_none_or(|b| amount >= b.amount) {
                best = Some(MaxBet { pos, amount });
            }
        }
    }
    best.ok_or(TableError::CouldNotFindMaxBet)
}

/// Sum of every seat's last contribution. Receipt amounts are attacker
/// controlled, so the sum is checked rather than trusted to fit.
pub fn pot_size(lineup: &[Seat], cache: &ReceiptCache) -> Result<Chips, TableError> {
    let mut total: Chips = 0;
    for seat in lineup {
        if let Some(amount) = contribution(seat, cache)? {
            total = total.checked_add(amount).ok_or_else(|| {
                TableError::InvalidParams("total contributions overflow".into())
            })?;
        }
    }
    Ok(total)
}

/// The minimum legal raise over the current maximum bet, given the level
/// the previous round closed at. Fails if no raise has occurred this round.
pub fn min_raise_amount(
    lineup: &[Seat],
    cache: &ReceiptCache,
    dealer: SeatIndex,
    last_round_max: Chips,
) -> Result<Chips, TableError> {
    check_args(lineup, dealer)?;
    let rotation: Vec<SeatIndex> = (0..lineup.len())
        .map(|offset| (dealer + 1 + offset) % lineup.len())
        .collect();
    let current = max_bet(lineup, cache, &rotation)?;
    if current.amount <= last_round_max {
        return Err(TableError::InvalidParams(format!(
            "no raise above {last_round_max} occurred"
        )));
    }
    // The raise floor is the largest contribution strictly between the two
    // levels, scanning the seats after the max bettor in table order.
    let mut below = last_round_max;
    for offset in 1..lineup.len() {
        let pos = (current.pos + offset) % lineup.len();
        if let Some(amount) = contribution(&lineup[pos], cache)?
            && amount > below
            && amount < current.amount
        {
            below = amount;
        }
    }
    Ok(current.amount - below)
}

/// The position within `active` holding the last check for the street, if
/// any seat's most recent action is that street's check.
fn last_checker(
    lineup: &[Seat],
    cache: &ReceiptCache,
    active: &[SeatIndex],
    kind: ReceiptKind,
) -> Result<Option<usize>, TableError> {
    let mut found = None;
    for (idx, &pos) in active.iter().enumerate() {
        if let Some(receipt) = last_receipt(&lineup[pos], cache)?
            && receipt.kind() == kind
        {
            found = Some(idx);
        }
    }
    Ok(found)
}

/// Resolve whose turn it is. `bb_amount` is only consulted preflop, where
/// the big blind retains an option to raise after everyone merely calls.
pub fn whos_turn(
    lineup: &[Seat],
    cache: &ReceiptCache,
    dealer: SeatIndex,
    street: Street,
    bb_amount: Option<Chips>,
) -> Result<SeatIndex, TableError> {
    check_args(lineup, dealer)?;
    if is_hand_complete(lineup, cache, dealer, street)? {
        return Err(TableError::NoOnesTurn);
    }
    let active = active_positions(lineup, cache, street, dealer)?;
    if active.is_empty() {
        return Err(TableError::NoActivePlayer);
    }
    if street != Street::Waiting {
        let max = max_bet(lineup, cache, &active)?;
        let mut level = true;
        for &pos in &active {
            if contribution(&lineup[pos], cache)? != Some(max.amount) {
                level = false;
                break;
            }
        }
        if !level {
            // Someone still owes a response to the maximum bettor.
            let idx = active
                .iter()
                .position(|&pos| pos == max.pos)
                .unwrap_or(active.len() - 1);
            return Ok(active[(idx + 1) % active.len()]);
        }
        if let Some(kind) = ReceiptKind::check_kind(street)
            && let Some(idx) = last_checker(lineup, cache, &active, kind)?
        {
            return Ok(active[(idx + 1) % active.len()]);
        }
        if street == Street::Preflop {
            let bb_amount = bb_amount.ok_or(TableError::UndefinedBbAmount)?;
            if max.amount == bb_amount {
                // The blind-position arithmetic counts folded seats as
                // involved, so the option only goes to a big blind that can
                // still act.
                let bb = bb_pos(lineup, street, dealer)?;
                if is_active(&lineup[bb], cache, street)? {
                    return Ok(bb);
                }
            }
        }
    }
    if street == Street::Waiting && active.len() == 2 {
        // Heads-up: the dealer posts the small blind and acts first, and
        // the dealer is the seat *before* the start of the active rotation.
        return Ok(active[1]);
    }
    Ok(active[0])
}

/// Whether the current betting round has concluded.
pub fn is_betting_done(
    lineup: &[Seat],
    cache: &ReceiptCache,
    dealer: SeatIndex,
    street: Street,
    bb_amount: Option<Chips>,
) -> Result<bool, TableError> {
    check_args(lineup, dealer)?;
    if is_hand_complete(lineup, cache, dealer, street)? {
        return Ok(true);
    }
    let active = active_positions(lineup, cache, street, dealer)?;
    let max = match max_bet(lineup, cache, &active) {
        Ok(max) => max,
        // Blinds not posted yet; betting has not even opened.
        Err(TableError::CouldNotFindMaxBet) if street == Street::Waiting => return Ok(false),
        Err(e) => return Err(e),
    };
    if street == Street::Waiting {
        return Ok(max.amount > 0);
    }
    if street == Street::Dealing {
        let mut missing = false;
        for &pos in &active {
            if last_receipt(&lineup[pos], cache)?.is_none() {
                missing = true;
                break;
            }
        }
        if !missing {
            return Ok(true);
        }
    }
    for &pos in &active {
        if contribution(&lineup[pos], cache)? != Some(max.amount) {
            return Ok(false);
        }
    }
    // Find the most recent seat whose latest action is a check for this or
    // an earlier street, and count exact checks for this street.
    let mut checker: Option<ReceiptKind> = None;
    let mut street_checks = 0;
    for seat in lineup {
        if let Some(receipt) = last_receipt(seat, cache)? {
            let kind = receipt.kind();
            if let Some(checked) = kind.checked_street()
                && checked <= street
            {
                checker = Some(kind);
                if checked == street {
                    street_checks += 1;
                }
            }
        }
    }
    if let Some(kind) = checker {
        if let Ok(bb) = bb_pos(lineup, street, dealer)
            && let Some(receipt) = last_receipt(&lineup[bb], cache)?
            && receipt.kind() == ReceiptKind::CheckPre
        {
            return Ok(true);
        }
        let done = ReceiptKind::check_kind(street) == Some(kind) && street_checks == active.len();
        return Ok(done);
    }
    if street == Street::Preflop {
        let bb_amount = bb_amount.ok_or(TableError::UndefinedBbAmount)?;
        if let Ok(bb) = bb_pos(lineup, street, dealer)
            && active.contains(&bb)
            && max.amount == bb_amount
        {
            // The big blind still holds the option to raise.
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether the whole hand is over. An all-in seat keeps the hand open
/// until showdown resolves it, since its money is still live.
pub fn is_hand_complete(
    lineup: &[Seat],
    cache: &ReceiptCache,
    dealer: SeatIndex,
    street: Street,
) -> Result<bool, TableError> {
    check_args(lineup, dealer)?;
    let active = active_positions(lineup, cache, street, dealer)?;
    let all_in = lineup
        .iter()
        .filter(|seat| seat.sitout == Some(Sitout::AllIn))
        .count();
    if street == Street::Showdown {
        let mut revealed = false;
        for seat in lineup {
            if let Some(receipt) = last_receipt(seat, cache)?
                && matches!(receipt.kind(), ReceiptKind::Show | ReceiptKind::Muck)
            {
                revealed = true;
                break;
            }
        }
        if revealed {
            return Ok(active.is_empty() && all_in == 0);
        }
    }
    Ok(active.len() <= 1 && all_in == 0)
}

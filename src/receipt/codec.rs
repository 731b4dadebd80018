//! Binary layout, signing, and signature recovery for action receipts.
//!
//! A receipt travels as `head.body.tail`: three base64 (URL-safe, unpadded)
//! segments joined with dots, or as one hex string `type-byte ‖ body ‖
//! tail`. The head is 3 bytes, holding the type tag plus the last two bytes
//! of the signer's address as a cheap consistency hint. The tail is a 65-byte
//! ECDSA signature `(r, s, v)` over the Keccak-256 hash of the body.
//!
//! The hint check is not a substitute for full verification: a relying
//! party that cares about authenticity must verify the recovered signer
//! against its own expectations. Parsing only guarantees that the encoded
//! hint matches the recovered signer.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use super::errors::ReceiptError;
use crate::table::entities::{Address, Chips, Street};

const HEAD_LEN: usize = 3;
const SIG_LEN: usize = 65;
const ACTION_BODY_LEN: usize = 12;
const LEAVE_BODY_LEN: usize = 31;
const DIST_HEAD_LEN: usize = 5;
const DIST_ENTRY_LEN: usize = 28;

/// The closed set of receipt types and their wire tags.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ReceiptKind {
    Bet,
    Fold,
    SitOut,
    CheckPre,
    CheckFlop,
    CheckTurn,
    CheckRiver,
    Show,
    Muck,
    Leave,
    Distribution,
}

impl ReceiptKind {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Bet => 1,
            Self::Fold => 2,
            Self::SitOut => 3,
            Self::CheckPre => 4,
            Self::CheckFlop => 5,
            Self::CheckTurn => 6,
            Self::CheckRiver => 7,
            Self::Show => 8,
            Self::Muck => 9,
            Self::Leave => 10,
            Self::Distribution => 11,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, ReceiptError> {
        match tag {
            1 => Ok(Self::Bet),
            2 => Ok(Self::Fold),
            3 => Ok(Self::SitOut),
            4 => Ok(Self::CheckPre),
            5 => Ok(Self::CheckFlop),
            6 => Ok(Self::CheckTurn),
            7 => Ok(Self::CheckRiver),
            8 => Ok(Self::Show),
            9 => Ok(Self::Muck),
            10 => Ok(Self::Leave),
            11 => Ok(Self::Distribution),
            other => Err(ReceiptError::UnknownReceiptType(other)),
        }
    }

    /// Whether this kind carries the `hand_id` + `amount` action body.
    #[must_use]
    pub const fn is_action(self) -> bool {
        !matches!(self, Self::Leave | Self::Distribution)
    }

    /// The check kind belonging to a betting street, if the street has one.
    #[must_use]
    pub const fn check_kind(street: Street) -> Option<Self> {
        match street {
            Street::Preflop => Some(Self::CheckPre),
            Street::Flop => Some(Self::CheckFlop),
            Street::Turn => Some(Self::CheckTurn),
            Street::River => Some(Self::CheckRiver),
            _ => None,
        }
    }

    /// The street a check kind belongs to; `None` for non-check kinds.
    #[must_use]
    pub const fn checked_street(self) -> Option<Street> {
        match self {
            Self::CheckPre => Some(Street::Preflop),
            Self::CheckFlop => Some(Street::Flop),
            Self::CheckTurn => Some(Street::Turn),
            Self::CheckRiver => Some(Street::River),
            _ => None,
        }
    }
}

impl fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Bet => "bet",
            Self::Fold => "fold",
            Self::SitOut => "sitOut",
            Self::CheckPre => "checkPre",
            Self::CheckFlop => "checkFlop",
            Self::CheckTurn => "checkTurn",
            Self::CheckRiver => "checkRiver",
            Self::Show => "show",
            Self::Muck => "muck",
            Self::Leave => "leave",
            Self::Distribution => "distribution",
        };
        write!(f, "{repr}")
    }
}

/// A 65-byte recoverable ECDSA signature. `v` is `27 + recovery_id`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReceiptSig {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

/// Body of the bet/fold/check/show/muck/sitOut family. Every action
/// receipt carries an amount: for `fold` it is the chips the folder already
/// committed (they stay in the pot), for `show`/`muck` the seat's final
/// contribution.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionPayload {
    pub hand_id: u32,
    pub amount: Chips,
    pub signer: Address,
    pub sig: ReceiptSig,
}

/// Body of a `leave` receipt: 4-byte hand id, the last 7 bytes of the
/// table address, and the 20-byte address of the leaving seat.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LeavePayload {
    pub hand_id: u32,
    pub table_hint: [u8; 7],
    pub leaver: Address,
    pub signer: Address,
    pub sig: ReceiptSig,
}

/// Body of a `distribution` receipt: the payout entries of a settled hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DistributionPayload {
    pub hand_id: u32,
    pub claim_id: u8,
    pub payouts: Vec<(Address, Chips)>,
    pub signer: Address,
    pub sig: ReceiptSig,
}

/// A parsed, signature-checked receipt: one variant per wire type, each
/// carrying only the fields that type supports.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Receipt {
    Bet(ActionPayload),
    Fold(ActionPayload),
    SitOut(ActionPayload),
    CheckPre(ActionPayload),
    CheckFlop(ActionPayload),
    CheckTurn(ActionPayload),
    CheckRiver(ActionPayload),
    Show(ActionPayload),
    Muck(ActionPayload),
    Leave(LeavePayload),
    Distribution(DistributionPayload),
}

impl Receipt {
    #[must_use]
    pub const fn kind(&self) -> ReceiptKind {
        match self {
            Self::Bet(_) => ReceiptKind::Bet,
            Self::Fold(_) => ReceiptKind::Fold,
            Self::SitOut(_) => ReceiptKind::SitOut,
            Self::CheckPre(_) => ReceiptKind::CheckPre,
            Self::CheckFlop(_) => ReceiptKind::CheckFlop,
            Self::CheckTurn(_) => ReceiptKind::CheckTurn,
            Self::CheckRiver(_) => ReceiptKind::CheckRiver,
            Self::Show(_) => ReceiptKind::Show,
            Self::Muck(_) => ReceiptKind::Muck,
            Self::Leave(_) => ReceiptKind::Leave,
            Self::Distribution(_) => ReceiptKind::Distribution,
        }
    }

    #[must_use]
    pub const fn hand_id(&self) -> u32 {
        match self {
            Self::Bet(p)
            | Self::Fold(p)
            | Self::SitOut(p)
            | Self::CheckPre(p)
            | Self::CheckFlop(p)
            | Self::CheckTurn(p)
            | Self::CheckRiver(p)
            | Self::Show(p)
            | Self::Muck(p) => p.hand_id,
            Self::Leave(p) => p.hand_id,
            Self::Distribution(p) => p.hand_id,
        }
    }

    /// The recovered signer address.
    #[must_use]
    pub const fn signer(&self) -> Address {
        match self {
            Self::Bet(p)
            | Self::Fold(p)
            | Self::SitOut(p)
            | Self::CheckPre(p)
            | Self::CheckFlop(p)
            | Self::CheckTurn(p)
            | Self::CheckRiver(p)
            | Self::Show(p)
            | Self::Muck(p) => p.signer,
            Self::Leave(p) => p.signer,
            Self::Distribution(p) => p.signer,
        }
    }

    /// The contribution amount; `None` for the non-action kinds.
    #[must_use]
    pub const fn amount(&self) -> Option<Chips> {
        match self {
            Self::Bet(p)
            | Self::Fold(p)
            | Self::SitOut(p)
            | Self::CheckPre(p)
            | Self::CheckFlop(p)
            | Self::CheckTurn(p)
            | Self::CheckRiver(p)
            | Self::Show(p)
            | Self::Muck(p) => Some(p.amount),
            Self::Leave(_) | Self::Distribution(_) => None,
        }
    }

    #[must_use]
    pub const fn sig(&self) -> &ReceiptSig {
        match self {
            Self::Bet(p)
            | Self::Fold(p)
            | Self::SitOut(p)
            | Self::CheckPre(p)
            | Self::CheckFlop(p)
            | Self::CheckTurn(p)
            | Self::CheckRiver(p)
            | Self::Show(p)
            | Self::Muck(p) => &p.sig,
            Self::Leave(p) => &p.sig,
            Self::Distribution(p) => &p.sig,
        }
    }

    /// Parse either wire form: dot-joined base64 segments, or a hex string
    /// (with or without a `0x` prefix).
    pub fn parse(encoded: &str) -> Result<Self, ReceiptError> {
        if encoded.contains('.') {
            Self::parse_dot(encoded)
        } else {
            Self::parse_hex(encoded)
        }
    }

    fn parse_dot(encoded: &str) -> Result<Self, ReceiptError> {
        let mut segments = encoded.split('.');
        let (Some(head), Some(body), Some(tail), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ReceiptError::Malformed(
                "expected exactly 3 dot-joined segments".into(),
            ));
        };
        let head = decode_segment(head, "head")?;
        let body = decode_segment(body, "body")?;
        let tail = decode_segment(tail, "tail")?;
        let [tag, hint0, hint1] = head[..] else {
            return Err(ReceiptError::Malformed(format!(
                "head must be {HEAD_LEN} bytes, got {}",
                head.len()
            )));
        };
        Self::assemble(ReceiptKind::from_tag(tag)?, &body, &tail, Some([hint0, hint1]))
    }

    fn parse_hex(encoded: &str) -> Result<Self, ReceiptError> {
        let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);
        let bytes = hex::decode(stripped)
            .map_err(|e| ReceiptError::Malformed(format!("bad hex encoding: {e}")))?;
        if bytes.len() < 1 + SIG_LEN {
            return Err(ReceiptError::Malformed(format!(
                "hex form needs a type byte and a {SIG_LEN}-byte tail, got {} bytes",
                bytes.len()
            )));
        }
        let kind = ReceiptKind::from_tag(bytes[0])?;
        let (body, tail) = bytes[1..].split_at(bytes.len() - 1 - SIG_LEN);
        // The hex head carries no hint bytes; only recovery is checked.
        Self::assemble(kind, body, tail, None)
    }

    fn assemble(
        kind: ReceiptKind,
        body: &[u8],
        tail: &[u8],
        hint: Option<[u8; 2]>,
    ) -> Result<Self, ReceiptError> {
        if tail.len() != SIG_LEN {
            return Err(ReceiptError::Malformed(format!(
                "tail must be {SIG_LEN} bytes, got {}",
                tail.len()
            )));
        }
        let (signer, sig) = recover_signer(body, tail)?;
        if let Some(hint) = hint {
            if signer.hint() != hint {
                log::warn!(
                    "receipt hint {} does not match recovered signer {signer}",
                    hex::encode(hint)
                );
                return Err(ReceiptError::SignatureVerificationFailed);
            }
        }

        if kind.is_action() {
            if body.len() != ACTION_BODY_LEN {
                return Err(ReceiptError::Malformed(format!(
                    "{kind} body must be {ACTION_BODY_LEN} bytes, got {}",
                    body.len()
                )));
            }
            let payload = ActionPayload {
                hand_id: u32::from_be_bytes(body[..4].try_into().expect("4-byte slice")),
                amount: Chips::from_be_bytes(body[4..12].try_into().expect("8-byte slice")),
                signer,
                sig,
            };
            return Ok(match kind {
                ReceiptKind::Bet => Self::Bet(payload),
                ReceiptKind::Fold => Self::Fold(payload),
                ReceiptKind::SitOut => Self::SitOut(payload),
                ReceiptKind::CheckPre => Self::CheckPre(payload),
                ReceiptKind::CheckFlop => Self::CheckFlop(payload),
                ReceiptKind::CheckTurn => Self::CheckTurn(payload),
                ReceiptKind::CheckRiver => Self::CheckRiver(payload),
                ReceiptKind::Show => Self::Show(payload),
                ReceiptKind::Muck => Self::Muck(payload),
                // Covered by is_action above.
                ReceiptKind::Leave | ReceiptKind::Distribution => unreachable!(),
            });
        }

        match kind {
            ReceiptKind::Leave => {
                if body.len() != LEAVE_BODY_LEN {
                    return Err(ReceiptError::Malformed(format!(
                        "leave body must be {LEAVE_BODY_LEN} bytes, got {}",
                        body.len()
                    )));
                }
                Ok(Self::Leave(LeavePayload {
                    hand_id: u32::from_be_bytes(body[..4].try_into().expect("4-byte slice")),
                    table_hint: body[4..11].try_into().expect("7-byte slice"),
                    leaver: Address::from_slice(&body[11..31]).expect("20-byte slice"),
                    signer,
                    sig,
                }))
            }
            ReceiptKind::Distribution => {
                if body.len() < DIST_HEAD_LEN
                    || (body.len() - DIST_HEAD_LEN) % DIST_ENTRY_LEN != 0
                {
                    return Err(ReceiptError::Malformed(format!(
                        "distribution body must be {DIST_HEAD_LEN} + n * {DIST_ENTRY_LEN} bytes, got {}",
                        body.len()
                    )));
                }
                let payouts = body[DIST_HEAD_LEN..]
                    .chunks_exact(DIST_ENTRY_LEN)
                    .map(|entry| {
                        let address = Address::from_slice(&entry[..20]).expect("20-byte slice");
                        let amount =
                            Chips::from_be_bytes(entry[20..].try_into().expect("8-byte slice"));
                        (address, amount)
                    })
                    .collect();
                Ok(Self::Distribution(DistributionPayload {
                    hand_id: u32::from_be_bytes(body[..4].try_into().expect("4-byte slice")),
                    claim_id: body[4],
                    payouts,
                    signer,
                    sig,
                }))
            }
            _ => unreachable!(),
        }
    }
}

fn decode_segment(segment: &str, which: &str) -> Result<Vec<u8>, ReceiptError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| ReceiptError::Malformed(format!("bad base64 in {which}: {e}")))
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive an account address: the low 20 bytes of the Keccak-256 hash of
/// the 64-byte uncompressed public key (without the 0x04 prefix).
fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..]).expect("20-byte slice")
}

fn recover_signer(body: &[u8], tail: &[u8]) -> Result<(Address, ReceiptSig), ReceiptError> {
    let digest = keccak256(body);
    let signature = Signature::from_slice(&tail[..64])
        .map_err(|_| ReceiptError::SignatureVerificationFailed)?;
    let v = tail[64];
    let recovery = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or(ReceiptError::SignatureVerificationFailed)?;
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery)
        .map_err(|_| ReceiptError::SignatureVerificationFailed)?;
    let bytes = signature.to_bytes();
    let sig = ReceiptSig {
        r: bytes[..32].try_into().expect("32-byte slice"),
        s: bytes[32..].try_into().expect("32-byte slice"),
        v: if v >= 27 { v } else { v + 27 },
    };
    Ok((address_of(&key), sig))
}

/// Signs receipt payloads with a secp256k1 private key, emitting either
/// wire form.
#[derive(Clone)]
pub struct ReceiptSigner {
    key: SigningKey,
    address: Address,
}

impl fmt::Debug for ReceiptSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose key material through Debug.
        f.debug_struct("ReceiptSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ReceiptSigner {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, ReceiptError> {
        let key = SigningKey::from_bytes(bytes.into()).map_err(|_| ReceiptError::InvalidKey)?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// The account address derived from this signer's public key.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Sign a bet/fold/check/show/muck/sitOut receipt into the dot form.
    pub fn sign_action(
        &self,
        kind: ReceiptKind,
        hand_id: u32,
        amount: Chips,
    ) -> Result<String, ReceiptError> {
        self.encode_dot(kind, &action_body(kind, hand_id, amount)?)
    }

    /// Hex-form counterpart of [`Self::sign_action`].
    pub fn sign_action_hex(
        &self,
        kind: ReceiptKind,
        hand_id: u32,
        amount: Chips,
    ) -> Result<String, ReceiptError> {
        self.encode_hex(kind, &action_body(kind, hand_id, amount)?)
    }

    pub fn sign_leave(
        &self,
        hand_id: u32,
        table: Address,
        leaver: Address,
    ) -> Result<String, ReceiptError> {
        self.encode_dot(ReceiptKind::Leave, &leave_body(hand_id, table, leaver))
    }

    pub fn sign_leave_hex(
        &self,
        hand_id: u32,
        table: Address,
        leaver: Address,
    ) -> Result<String, ReceiptError> {
        self.encode_hex(ReceiptKind::Leave, &leave_body(hand_id, table, leaver))
    }

    pub fn sign_distribution(
        &self,
        hand_id: u32,
        claim_id: u8,
        payouts: &[(Address, Chips)],
    ) -> Result<String, ReceiptError> {
        self.encode_dot(
            ReceiptKind::Distribution,
            &distribution_body(hand_id, claim_id, payouts),
        )
    }

    pub fn sign_distribution_hex(
        &self,
        hand_id: u32,
        claim_id: u8,
        payouts: &[(Address, Chips)],
    ) -> Result<String, ReceiptError> {
        self.encode_hex(
            ReceiptKind::Distribution,
            &distribution_body(hand_id, claim_id, payouts),
        )
    }

    fn tail(&self, body: &[u8]) -> Result<[u8; SIG_LEN], ReceiptError> {
        let digest = keccak256(body);
        let (signature, recovery) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|_| ReceiptError::InvalidKey)?;
        let mut tail = [0u8; SIG_LEN];
        tail[..64].copy_from_slice(&signature.to_bytes());
        tail[64] = 27 + recovery.to_byte();
        Ok(tail)
    }

    fn encode_dot(&self, kind: ReceiptKind, body: &[u8]) -> Result<String, ReceiptError> {
        let hint = self.address.hint();
        let head = [kind.tag(), hint[0], hint[1]];
        let tail = self.tail(body)?;
        Ok(format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(head),
            URL_SAFE_NO_PAD.encode(body),
            URL_SAFE_NO_PAD.encode(tail)
        ))
    }

    fn encode_hex(&self, kind: ReceiptKind, body: &[u8]) -> Result<String, ReceiptError> {
        let tail = self.tail(body)?;
        let mut bytes = Vec::with_capacity(1 + body.len() + SIG_LEN);
        bytes.push(kind.tag());
        bytes.extend_from_slice(body);
        bytes.extend_from_slice(&tail);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

fn action_body(kind: ReceiptKind, hand_id: u32, amount: Chips) -> Result<Vec<u8>, ReceiptError> {
    if !kind.is_action() {
        return Err(ReceiptError::Malformed(format!(
            "{kind} does not take the action body"
        )));
    }
    let mut body = Vec::with_capacity(ACTION_BODY_LEN);
    body.extend_from_slice(&hand_id.to_be_bytes());
    body.extend_from_slice(&amount.to_be_bytes());
    Ok(body)
}

fn leave_body(hand_id: u32, table: Address, leaver: Address) -> Vec<u8> {
    let mut body = Vec::with_capacity(LEAVE_BODY_LEN);
    body.extend_from_slice(&hand_id.to_be_bytes());
    body.extend_from_slice(&table.as_bytes()[13..]);
    body.extend_from_slice(leaver.as_bytes());
    body
}

fn distribution_body(hand_id: u32, claim_id: u8, payouts: &[(Address, Chips)]) -> Vec<u8> {
    let mut body = Vec::with_capacity(DIST_HEAD_LEN + payouts.len() * DIST_ENTRY_LEN);
    body.extend_from_slice(&hand_id.to_be_bytes());
    body.push(claim_id);
    for (address, amount) in payouts {
        body.extend_from_slice(address.as_bytes());
        body.extend_from_slice(&amount.to_be_bytes());
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(seed: u8) -> ReceiptSigner {
        ReceiptSigner::from_bytes(&[seed; 32]).unwrap()
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [
            ReceiptKind::Bet,
            ReceiptKind::Fold,
            ReceiptKind::SitOut,
            ReceiptKind::CheckPre,
            ReceiptKind::CheckFlop,
            ReceiptKind::CheckTurn,
            ReceiptKind::CheckRiver,
            ReceiptKind::Show,
            ReceiptKind::Muck,
            ReceiptKind::Leave,
            ReceiptKind::Distribution,
        ] {
            assert_eq!(ReceiptKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert_eq!(
            ReceiptKind::from_tag(0),
            Err(ReceiptError::UnknownReceiptType(0))
        );
        assert_eq!(
            ReceiptKind::from_tag(99),
            Err(ReceiptError::UnknownReceiptType(99))
        );
    }

    #[test]
    fn test_check_kind_per_street() {
        assert_eq!(
            ReceiptKind::check_kind(Street::Preflop),
            Some(ReceiptKind::CheckPre)
        );
        assert_eq!(
            ReceiptKind::check_kind(Street::River),
            Some(ReceiptKind::CheckRiver)
        );
        assert_eq!(ReceiptKind::check_kind(Street::Waiting), None);
        assert_eq!(ReceiptKind::check_kind(Street::Showdown), None);
        assert_eq!(
            ReceiptKind::CheckFlop.checked_street(),
            Some(Street::Flop)
        );
        assert_eq!(ReceiptKind::Bet.checked_street(), None);
    }

    #[test]
    fn test_sign_and_parse_bet() {
        let signer = signer(1);
        let encoded = signer.sign_action(ReceiptKind::Bet, 7, 500).unwrap();
        let receipt = Receipt::parse(&encoded).unwrap();
        assert_eq!(receipt.kind(), ReceiptKind::Bet);
        assert_eq!(receipt.hand_id(), 7);
        assert_eq!(receipt.amount(), Some(500));
        assert_eq!(receipt.signer(), signer.address());
    }

    #[test]
    fn test_hex_form_matches_dot_form() {
        let signer = signer(2);
        let dot = signer.sign_action(ReceiptKind::Show, 3, 1200).unwrap();
        let hex_form = signer.sign_action_hex(ReceiptKind::Show, 3, 1200).unwrap();
        assert!(hex_form.starts_with("0x"));
        assert_eq!(Receipt::parse(&dot).unwrap(), Receipt::parse(&hex_form).unwrap());
    }

    #[test]
    fn test_sign_action_rejects_non_action_kind() {
        let signer = signer(3);
        assert!(matches!(
            signer.sign_action(ReceiptKind::Leave, 1, 0),
            Err(ReceiptError::Malformed(_))
        ));
    }

    #[test]
    fn test_leave_round_trip() {
        let signer = signer(4);
        let table = Address::new([0xaa; 20]);
        let leaver = Address::new([0xbb; 20]);
        let encoded = signer.sign_leave(9, table, leaver).unwrap();
        let Receipt::Leave(payload) = Receipt::parse(&encoded).unwrap() else {
            panic!("expected a leave receipt");
        };
        assert_eq!(payload.hand_id, 9);
        assert_eq!(payload.table_hint, [0xaa; 7]);
        assert_eq!(payload.leaver, leaver);
        assert_eq!(payload.signer, signer.address());
    }

    #[test]
    fn test_distribution_round_trip() {
        let signer = signer(5);
        let payouts = vec![
            (Address::new([1; 20]), 1485),
            (Address::new([2; 20]), 15),
        ];
        let encoded = signer.sign_distribution(12, 1, &payouts).unwrap();
        let Receipt::Distribution(payload) = Receipt::parse(&encoded).unwrap() else {
            panic!("expected a distribution receipt");
        };
        assert_eq!(payload.hand_id, 12);
        assert_eq!(payload.claim_id, 1);
        assert_eq!(payload.payouts, payouts);
        assert_eq!(Receipt::parse(&encoded).unwrap().amount(), None);
    }

    #[test]
    fn test_tampered_body_fails_or_changes_signer() {
        let signer = signer(6);
        let encoded = signer.sign_action(ReceiptKind::Bet, 1, 1000).unwrap();
        let (head, rest) = encoded.split_once('.').unwrap();
        let (body, tail) = rest.split_once('.').unwrap();
        let tampered_body = URL_SAFE_NO_PAD.encode({
            let mut bytes = URL_SAFE_NO_PAD.decode(body).unwrap();
            bytes[11] ^= 0x01;
            bytes
        });
        let tampered = format!("{head}.{tampered_body}.{tail}");
        // A different body hash recovers a different key, which the head
        // hint rejects (up to the 1-in-65536 hint collision).
        match Receipt::parse(&tampered) {
            Err(ReceiptError::SignatureVerificationFailed) => {}
            Ok(receipt) => assert_ne!(receipt.signer(), signer.address()),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_wrong_hint_fails_verification() {
        let signer = signer(7);
        let encoded = signer.sign_action(ReceiptKind::Fold, 1, 50).unwrap();
        let (_, rest) = encoded.split_once('.').unwrap();
        let hint = signer.address().hint();
        let forged_head =
            URL_SAFE_NO_PAD.encode([ReceiptKind::Fold.tag(), hint[0] ^ 0xff, hint[1]]);
        assert_eq!(
            Receipt::parse(&format!("{forged_head}.{rest}")),
            Err(ReceiptError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let signer = signer(8);
        let encoded = signer.sign_action(ReceiptKind::Bet, 1, 50).unwrap();
        let (_, rest) = encoded.split_once('.').unwrap();
        let hint = signer.address().hint();
        let forged_head = URL_SAFE_NO_PAD.encode([200u8, hint[0], hint[1]]);
        assert_eq!(
            Receipt::parse(&format!("{forged_head}.{rest}")),
            Err(ReceiptError::UnknownReceiptType(200))
        );
    }

    #[test]
    fn test_malformed_segments_rejected() {
        assert!(matches!(
            Receipt::parse("only.two"),
            Err(ReceiptError::Malformed(_))
        ));
        assert!(matches!(
            Receipt::parse("a.b.c.d"),
            Err(ReceiptError::Malformed(_))
        ));
        assert!(matches!(
            Receipt::parse("!!!.###.$$$"),
            Err(ReceiptError::Malformed(_))
        ));
        assert!(matches!(
            Receipt::parse("0xzz"),
            Err(ReceiptError::Malformed(_))
        ));
        // Hex form too short to hold a tail.
        assert!(matches!(
            Receipt::parse("0x0102"),
            Err(ReceiptError::Malformed(_))
        ));
    }

    #[test]
    fn test_signer_address_is_deterministic() {
        assert_eq!(signer(9).address(), signer(9).address());
        assert_ne!(signer(9).address(), signer(10).address());
        assert!(!signer(9).address().is_empty());
    }

    #[test]
    fn test_receipt_serde_round_trip() {
        let signer = signer(12);
        let encoded = signer.sign_action(ReceiptKind::Bet, 5, 250).unwrap();
        let receipt = Receipt::parse(&encoded).unwrap();
        let json = serde_json::to_string(&receipt).unwrap();
        assert_eq!(serde_json::from_str::<Receipt>(&json).unwrap(), receipt);
    }

    #[test]
    fn test_parse_accepts_raw_recovery_byte() {
        let signer = signer(11);
        let encoded = signer.sign_action(ReceiptKind::Bet, 2, 75).unwrap();
        let (head, rest) = encoded.split_once('.').unwrap();
        let (body, tail) = rest.split_once('.').unwrap();
        let mut tail_bytes = URL_SAFE_NO_PAD.decode(tail).unwrap();
        tail_bytes[64] -= 27;
        let raw_tail = URL_SAFE_NO_PAD.encode(tail_bytes);
        let reparsed = Receipt::parse(&format!("{head}.{body}.{raw_tail}")).unwrap();
        assert_eq!(reparsed.signer(), signer.address());
    }
}

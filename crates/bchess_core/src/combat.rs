//! Hit-point combat.
//!
//! Moving onto an enemy is an attack rather than an automatic capture:
//!
//! ```text
//! Damage = max(MIN_DAMAGE, Attack - Defense)
//! ```
//!
//! A defender reduced to 0 hp is defeated: it leaves the board and the
//! attacker takes its square. A defender that survives keeps its square and
//! the attacker stays where it was.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::piece::PieceId;
use crate::square::Square;
use crate::state::GameState;

/// Minimum damage floor - attacks always deal at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Result of applying a move with [`resolve_combat`].
///
/// Serializes as `{"type":"move","damage":0}`, `{"type":"hit",...}` or
/// `{"type":"defeat",...}`; every outcome carries its damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "OutcomeRecord", from = "OutcomeRecord")]
pub enum CombatOutcome {
    /// Destination was empty; the piece relocated.
    Move,
    /// Defender survived with reduced hp; nobody moved.
    Hit {
        /// Damage dealt.
        damage: u32,
        /// Defender hp after the hit.
        remaining_hp: u32,
    },
    /// Defender was removed and the attacker took its square.
    Defeat {
        /// Damage dealt.
        damage: u32,
    },
}

/// Serialized shape of [`CombatOutcome`].
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutcomeRecord {
    Move {
        #[serde(default)]
        damage: u32,
    },
    Hit {
        damage: u32,
        remaining_hp: u32,
    },
    Defeat {
        damage: u32,
    },
}

impl From<CombatOutcome> for OutcomeRecord {
    fn from(outcome: CombatOutcome) -> Self {
        match outcome {
            CombatOutcome::Move => Self::Move { damage: 0 },
            CombatOutcome::Hit {
                damage,
                remaining_hp,
            } => Self::Hit {
                damage,
                remaining_hp,
            },
            CombatOutcome::Defeat { damage } => Self::Defeat { damage },
        }
    }
}

impl From<OutcomeRecord> for CombatOutcome {
    fn from(record: OutcomeRecord) -> Self {
        match record {
            OutcomeRecord::Move { .. } => Self::Move,
            OutcomeRecord::Hit {
                damage,
                remaining_hp,
            } => Self::Hit {
                damage,
                remaining_hp,
            },
            OutcomeRecord::Defeat { damage } => Self::Defeat { damage },
        }
    }
}

impl CombatOutcome {
    /// Damage dealt (0 for a plain move).
    #[must_use]
    pub const fn damage(&self) -> u32 {
        match self {
            Self::Move => 0,
            Self::Hit { damage, .. } | Self::Defeat { damage } => *damage,
        }
    }

    /// Defender hp after a non-lethal hit.
    #[must_use]
    pub const fn remaining_hp(&self) -> Option<u32> {
        match self {
            Self::Hit { remaining_hp, .. } => Some(*remaining_hp),
            _ => None,
        }
    }

    /// Whether the attacker ended up on the destination square.
    #[must_use]
    pub const fn attacker_moved(&self) -> bool {
        !matches!(self, Self::Hit { .. })
    }
}

/// Damage an attack deals to a defender.
///
/// Never less than [`MIN_DAMAGE`], however much the defense exceeds the
/// attack.
#[must_use]
pub const fn calculate_damage(atk: u32, def: u32) -> u32 {
    let raw = atk.saturating_sub(def);
    if raw < MIN_DAMAGE {
        MIN_DAMAGE
    } else {
        raw
    }
}

/// Apply a move for `attacker_id` onto `target`.
///
/// The caller must already have checked that `target` is one of the
/// attacker's legal destinations; this function does not re-validate
/// movement rules, turn order, or whether `target` holds a friendly piece.
/// Turn advancement and win detection are also left to the caller.
///
/// # Errors
///
/// Returns [`GameError::PieceNotFound`] if the attacker is not a live piece.
pub fn resolve_combat(
    state: &mut GameState,
    attacker_id: PieceId,
    target: Square,
) -> Result<CombatOutcome> {
    let atk = state
        .piece(attacker_id)
        .map(|p| p.atk)
        .ok_or(GameError::PieceNotFound(attacker_id))?;

    let Some(defender_id) = state.piece_at(target) else {
        state.relocate(attacker_id, target)?;
        return Ok(CombatOutcome::Move);
    };

    let defender = state
        .piece_mut(defender_id)
        .ok_or(GameError::PieceNotFound(defender_id))?;
    let damage = calculate_damage(atk, defender.def);
    defender.hp = defender.hp.saturating_sub(damage);
    let remaining_hp = defender.hp;

    tracing::debug!(
        attacker = %attacker_id,
        defender = %defender_id,
        square = %target,
        damage,
        remaining_hp,
        "Resolved attack"
    );

    if remaining_hp == 0 {
        state.remove_piece(defender_id);
        state.relocate(attacker_id, target)?;
        Ok(CombatOutcome::Defeat { damage })
    } else {
        Ok(CombatOutcome::Hit {
            damage,
            remaining_hp,
        })
    }
}

//! Commitment to a recorded action sequence.

/// SHA-256 over the bincode encoding of each action, in order.
///
/// Two replays with the same root submitted the same commands. Used by the
/// replay repository to detect tampered or truncated logs. Fails when an
/// action cannot be encoded.
#[cfg(feature = "serde")]
pub fn compute_actions_root(actions: &[super::BattleAction]) -> Result<[u8; 32], bincode::Error> {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for action in actions {
        hasher.update(bincode::serialize(action)?);
    }
    Ok(hasher.finalize().into())
}

//! Random identity generation.

use crate::application::ports::IdentitySource;
use crate::domain::identity::AnonymousIdentity;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 9;

/// Mints identities of the form `<prefix><9 random base36 chars><base36 millis>`.
///
/// Collisions are irrelevant here: an identity only has to be stable for one
/// installation, not unique across the world.
#[derive(Debug)]
pub struct RandomIdentitySource {
    prefix: String,
    rng: Mutex<StdRng>,
}

impl RandomIdentitySource {
    /// Create a source seeded from OS entropy.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: clean_prefix(prefix.into()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministic source for tests and replays.
    pub fn seeded(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: clean_prefix(prefix.into()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The prefix prepended to every identity.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl IdentitySource for RandomIdentitySource {
    fn generate(&self, now: NaiveDateTime) -> AnonymousIdentity {
        let mut token = String::with_capacity(self.prefix.len() + RANDOM_LEN + 10);
        token.push_str(&self.prefix);
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            for _ in 0..RANDOM_LEN {
                token.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
            }
        }
        let millis = now.and_utc().timestamp_millis().max(0) as u64;
        token.push_str(&to_base36(millis));

        AnonymousIdentity::from_token(token)
    }
}

fn clean_prefix(prefix: String) -> String {
    prefix.split_whitespace().collect()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

//! Chronologically sortable push keys
//!
//! Keys are 20 characters: 8 characters encoding the millisecond timestamp
//! followed by 12 characters of entropy, all drawn from an alphabet whose byte
//! order matches its sort order. Keys generated within the same millisecond
//! increment the entropy suffix so they still sort in generation order.

use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

#[derive(Debug, Default)]
struct PushState {
    last_ms: i64,
    last_random: [u8; RANDOM_CHARS],
}

/// Generator for push keys; one instance per client
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    state: Mutex<PushState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next key for the current time
    pub fn next_id(&self) -> String {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&self, now_ms: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());

        if now_ms == state.last_ms {
            for digit in state.last_random.iter_mut().rev() {
                if *digit == 63 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    break;
                }
            }
        } else {
            state.last_ms = now_ms;
            let entropy = Uuid::new_v4();
            for (digit, byte) in state.last_random.iter_mut().zip(entropy.as_bytes()) {
                *digit = byte % 64;
            }
            // Leave headroom so same-millisecond increments never wrap the suffix
            state.last_random[0] &= 0x1f;
        }

        let mut time_part = [0u8; TIME_CHARS];
        let mut ts = now_ms.max(0);
        for slot in time_part.iter_mut().rev() {
            *slot = PUSH_CHARS[(ts % 64) as usize];
            ts /= 64;
        }

        let mut key = String::with_capacity(TIME_CHARS + RANDOM_CHARS);
        key.extend(time_part.iter().map(|b| *b as char));
        key.extend(
            state
                .last_random
                .iter()
                .map(|d| PUSH_CHARS[*d as usize] as char),
        );
        key
    }
}

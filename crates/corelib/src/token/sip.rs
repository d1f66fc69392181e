//! SipHash-1-3 token implementation (alternate partitioner).

use crate::token::traits::Token;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// SipHash token using u64 representation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SipToken(pub u64);

impl Token for SipToken {
    fn zero() -> Self {
        SipToken(0)
    }

    fn max() -> Self {
        SipToken(u64::MAX)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn is_max(&self) -> bool {
        self.0 == u64::MAX
    }

    fn distance_to(&self, other: &Self) -> Self {
        if other.0 >= self.0 {
            SipToken(other.0 - self.0)
        } else {
            SipToken((u64::MAX - self.0) + other.0 + 1)
        }
    }
}

impl SipToken {
    /// Creates a token from a byte slice using SipHash-1-3.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = SipHasher13::new();
        data.hash(&mut hasher);
        SipToken(hasher.finish())
    }

    /// Creates a token from a string key.
    pub fn from_key(key: &str) -> Self {
        Self::from_bytes(key.as_bytes())
    }
}

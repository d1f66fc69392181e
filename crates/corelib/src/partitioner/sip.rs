//! SipHash partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::sip::SipToken;
use crate::token::Token;

/// SipHash-1-3 partitioner (keyed-hash quality distribution).
#[derive(Clone, Debug, Default)]
pub struct SipPartitioner;

impl Partitioner for SipPartitioner {
    type TokenType = SipToken;

    fn partition(&self, key: &[u8]) -> Self::TokenType {
        SipToken::from_bytes(key)
    }

    fn min_token(&self) -> Self::TokenType {
        SipToken::zero()
    }

    fn max_token(&self) -> Self::TokenType {
        <SipToken as Token>::max()
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}

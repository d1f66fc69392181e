//! xxh3 partitioner implementation (default).

use crate::partitioner::traits::Partitioner;
use crate::token::xxh3::Xxh3Token;
use crate::token::Token;

/// xxh3 partitioner: fast, uniform 64-bit placement.
#[derive(Clone, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    type TokenType = Xxh3Token;

    fn partition(&self, key: &[u8]) -> Self::TokenType {
        Xxh3Token::from_bytes(key)
    }

    fn min_token(&self) -> Self::TokenType {
        Xxh3Token::zero()
    }

    fn max_token(&self) -> Self::TokenType {
        <Xxh3Token as Token>::max()
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}

//! The `KeyCache` contract: sub-millisecond lookups of public keys by
//! identifier, bounded in size, polymorphic over storage.

use std::time::Duration;

use async_trait::async_trait;
use vouch_core::{Identifier, PublicKey};

#[async_trait]
pub trait KeyCache: Send + Sync {
    async fn get(&self, key: &Identifier) -> Option<PublicKey>;
    async fn set(&self, key: Identifier, value: PublicKey, ttl: Option<Duration>);
    async fn delete(&self, key: &Identifier) -> bool;
    async fn clear(&self);
}

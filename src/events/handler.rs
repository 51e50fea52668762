//! Event listener trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::prelude::Context;

use super::kind::{EventKind, EventPayload};

/// A handler bound to one gateway event
///
/// `C` is the session handle passed to every invocation; serenity's
/// `Context` in the running bot.
#[async_trait]
pub trait EventListener<C = Context>: Send + Sync
where
    C: Send + 'static,
{
    fn event(&self) -> EventKind;

    /// Fire only for the first emission
    fn once(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: C, payload: EventPayload) -> Result<()>;
}

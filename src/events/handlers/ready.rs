//! Ready listener
//!
//! Logs the connected identity and sets the configured activity.

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::gateway::Activity;
use serenity::prelude::Context;

use crate::events::handler::EventListener;
use crate::events::kind::{EventKind, EventPayload};

pub struct ReadyListener {
    activity: Option<String>,
}

impl ReadyListener {
    pub fn new(activity: Option<String>) -> Self {
        Self { activity }
    }
}

#[async_trait]
impl EventListener for ReadyListener {
    fn event(&self) -> EventKind {
        EventKind::Ready
    }

    fn once(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: Context, payload: EventPayload) -> Result<()> {
        let EventPayload::Ready(ready) = payload else {
            return Ok(());
        };

        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(activity) = &self.activity {
            ctx.set_activity(Activity::watching(activity)).await;
            info!("Activity set to \"Watching {activity}\"");
        }
        Ok(())
    }
}

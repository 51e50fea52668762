//! Gateway event vocabulary
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serenity::model::application::interaction::Interaction;
use serenity::model::channel::{Message, Reaction};
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member, UnavailableGuild};
use serenity::model::id::GuildId;
use std::fmt;

/// Identifier of an event a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Ready,
    Resume,
    CacheReady,
    GuildCreate,
    GuildDelete,
    GuildMemberAdd,
    MessageCreate,
    ReactionAdd,
    InteractionCreate,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::Ready,
        EventKind::Resume,
        EventKind::CacheReady,
        EventKind::GuildCreate,
        EventKind::GuildDelete,
        EventKind::GuildMemberAdd,
        EventKind::MessageCreate,
        EventKind::ReactionAdd,
        EventKind::InteractionCreate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::Resume => "resume",
            EventKind::CacheReady => "cacheReady",
            EventKind::GuildCreate => "guildCreate",
            EventKind::GuildDelete => "guildDelete",
            EventKind::GuildMemberAdd => "guildMemberAdd",
            EventKind::MessageCreate => "messageCreate",
            EventKind::ReactionAdd => "messageReactionAdd",
            EventKind::InteractionCreate => "interactionCreate",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload of an emitted event, passed to listeners unchanged
#[derive(Debug, Clone)]
pub enum EventPayload {
    Ready(Box<Ready>),
    Resume(ResumedEvent),
    CacheReady(Vec<GuildId>),
    GuildCreate { guild: Box<Guild>, is_new: bool },
    GuildDelete {
        incomplete: UnavailableGuild,
        full: Option<Box<Guild>>,
    },
    GuildMemberAdd(Box<Member>),
    MessageCreate(Box<Message>),
    ReactionAdd(Box<Reaction>),
    InteractionCreate(Box<Interaction>),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Ready(_) => EventKind::Ready,
            EventPayload::Resume(_) => EventKind::Resume,
            EventPayload::CacheReady(_) => EventKind::CacheReady,
            EventPayload::GuildCreate { .. } => EventKind::GuildCreate,
            EventPayload::GuildDelete { .. } => EventKind::GuildDelete,
            EventPayload::GuildMemberAdd(_) => EventKind::GuildMemberAdd,
            EventPayload::MessageCreate(_) => EventKind::MessageCreate,
            EventPayload::ReactionAdd(_) => EventKind::ReactionAdd,
            EventPayload::InteractionCreate(_) => EventKind::InteractionCreate,
        }
    }
}

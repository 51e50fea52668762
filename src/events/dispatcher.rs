//! Event dispatcher
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Discovery, once/persistent subscriptions, contained listener failures

use log::{debug, error, info, warn};
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::handler::EventListener;
use super::kind::{EventKind, EventPayload};
use crate::core::error::{panic_message, DiscoveryError, HandlerExecutionError};
use crate::registry::{DiscoveryReport, HandlerRegistry, HandlerSource, Keyed};

/// A loaded listener keyed by the event it binds
pub struct EventEntry<C: Send + 'static = Context> {
    pub event: EventKind,
    pub once: bool,
    pub listener: Arc<dyn EventListener<C>>,
}

impl<C: Send + 'static> Keyed for EventEntry<C> {
    type Key = EventKind;
    const KIND: &'static str = "event";

    fn key(&self) -> Result<EventKind, DiscoveryError> {
        Ok(self.event)
    }
}

struct Subscription<C: Send + 'static> {
    listener: Arc<dyn EventListener<C>>,
    once: bool,
    fired: AtomicBool,
}

/// What happened to one emitted event
#[derive(Debug)]
pub enum EmitOutcome {
    /// Nothing subscribed to this event
    NoListener,
    /// A once-listener already fired
    Spent,
    Completed,
    Failed(HandlerExecutionError),
}

/// Forwards gateway events to their listeners
///
/// Emission before [`register_events`](Self::register_events) delivers nothing.
pub struct EventDispatcher<C: Send + 'static = Context> {
    registry: HandlerRegistry<EventEntry<C>>,
    subscriptions: HashMap<EventKind, Subscription<C>>,
    registered: bool,
}

impl<C> EventDispatcher<C>
where
    C: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            subscriptions: HashMap::new(),
            registered: false,
        }
    }

    /// Populate the registry from a listener source
    pub fn load_events<S>(&mut self, source: &S) -> DiscoveryReport
    where
        S: HandlerSource<Arc<dyn EventListener<C>>> + ?Sized,
    {
        let entries = source.load().into_iter().map(|listener| EventEntry {
            event: listener.event(),
            once: listener.once(),
            listener,
        });
        let (registry, report) = HandlerRegistry::from_entries(entries);
        self.registry = registry;
        report
    }

    /// Subscribe every loaded listener; returns the number subscribed
    pub fn register_events(&mut self) -> usize {
        if self.registered {
            warn!("Events already registered - ignoring repeated registration");
            return self.subscriptions.len();
        }

        for entry in self.registry.values() {
            debug!(
                "Subscribing {} listener for '{}'",
                if entry.once { "one-shot" } else { "persistent" },
                entry.event
            );
            self.subscriptions.insert(
                entry.event,
                Subscription {
                    listener: Arc::clone(&entry.listener),
                    once: entry.once,
                    fired: AtomicBool::new(false),
                },
            );
        }
        self.registered = true;

        info!("Registered {} event listeners.", self.subscriptions.len());
        self.subscriptions.len()
    }

    pub fn is_subscribed(&self, event: EventKind) -> bool {
        self.subscriptions.contains_key(&event)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Deliver an event to its listener, if any
    pub async fn emit(&self, ctx: C, payload: EventPayload) -> EmitOutcome {
        let kind = payload.kind();
        let Some(subscription) = self.subscriptions.get(&kind) else {
            return EmitOutcome::NoListener;
        };

        // one-shot listeners unsubscribe on first delivery
        if subscription.once && subscription.fired.swap(true, Ordering::SeqCst) {
            return EmitOutcome::Spent;
        }

        let listener = Arc::clone(&subscription.listener);
        let task = tokio::spawn(async move { listener.execute(ctx, payload).await });

        let message = match task.await {
            Ok(Ok(())) => return EmitOutcome::Completed,
            Ok(Err(e)) => format!("{e:#}"),
            Err(join_error) => panic_message(join_error),
        };

        let failure = HandlerExecutionError::new(kind.as_str(), message);
        error!("Error handling event '{kind}': {}", failure.message);
        EmitOutcome::Failed(failure)
    }
}

impl<C: Send + 'static> Default for EventDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

//! Command dispatcher
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Discovery, remote reconciliation and gated interaction routing

use log::{debug, error, info};
use serenity::model::id::{GuildId, UserId};
use std::sync::Arc;
use uuid::Uuid;

use super::context::{CommandInvocation, Interaction};
use super::definition::CommandDefinition;
use super::gates::authorize;
use super::handler::SlashCommand;
use super::manifest::CommandManifest;
use super::registration::{reconcile, CommandRegistrar, RegistrationReport};
use crate::core::error::{
    panic_message, AuthorizationDenied, DiscoveryError, HandlerExecutionError, RegistrationError,
};
use crate::registry::{DiscoveryReport, HandlerRegistry, HandlerSource, Keyed};

/// A loaded command: its (possibly manifest-adjusted) definition and body
pub struct CommandEntry<I: Interaction = CommandInvocation> {
    pub definition: CommandDefinition,
    pub handler: Arc<dyn SlashCommand<I>>,
}

impl<I: Interaction> Keyed for CommandEntry<I> {
    type Key = String;
    const KIND: &'static str = "command";

    fn key(&self) -> Result<String, DiscoveryError> {
        self.definition.validate()?;
        Ok(self.definition.name.clone())
    }
}

/// What happened to one inbound interaction
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not a command, or no handler by that name
    Ignored,
    Denied(AuthorizationDenied),
    Completed,
    Failed(HandlerExecutionError),
}

/// Routes slash command invocations to their handlers
///
/// Build it, `load_commands`, `register_commands`, then share it read-only
/// (behind an `Arc`) with the interaction listener.
pub struct CommandDispatcher<I: Interaction = CommandInvocation> {
    registry: HandlerRegistry<CommandEntry<I>>,
    owners: Vec<UserId>,
    manifest: CommandManifest,
}

impl<I: Interaction> CommandDispatcher<I> {
    pub fn new(owners: Vec<UserId>, manifest: CommandManifest) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            owners,
            manifest,
        }
    }

    /// Populate the registry from a handler source
    pub fn load_commands<S>(&mut self, source: &S) -> DiscoveryReport
    where
        S: HandlerSource<Arc<dyn SlashCommand<I>>> + ?Sized,
    {
        let entries = source.load().into_iter().map(|handler| CommandEntry {
            definition: self.manifest.apply(handler.definition()),
            handler,
        });
        let (registry, report) = HandlerRegistry::from_entries(entries);
        self.manifest.warn_unmatched(registry.keys());
        self.registry = registry;
        report
    }

    /// Reconcile the loaded commands with the remote API
    ///
    /// `dev_guild` selects development mode.
    pub async fn register_commands(
        &self,
        registrar: &dyn CommandRegistrar,
        dev_guild: Option<GuildId>,
    ) -> Result<RegistrationReport, RegistrationError> {
        reconcile(registrar, &self.definitions(), dev_guild).await
    }

    /// Loaded definitions, sorted by name
    pub fn definitions(&self) -> Vec<CommandDefinition> {
        let mut definitions: Vec<CommandDefinition> = self
            .registry
            .values()
            .map(|entry| entry.definition.clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Gate and run one inbound interaction
    ///
    /// Gate failures produce exactly one ephemeral reply. Once the body runs
    /// the dispatcher never replies; body errors and panics are logged and
    /// returned as [`DispatchOutcome::Failed`].
    pub async fn handle_interaction(&self, interaction: Arc<I>) -> DispatchOutcome {
        if !interaction.is_command() {
            return DispatchOutcome::Ignored;
        }

        let context = interaction.context();
        let Some(entry) = self.registry.get(&context.command_name) else {
            debug!("Ignoring unknown command '{}'", context.command_name);
            return DispatchOutcome::Ignored;
        };

        let request_id = Uuid::new_v4();
        let name = context.command_name.clone();
        debug!(
            "[{request_id}] /{name} invoked by {} in {}",
            context.user_id,
            context
                .guild_id
                .map(|g| g.to_string())
                .unwrap_or_else(|| "DM".to_string())
        );

        if let Err(denied) = authorize(&entry.definition, &context, &self.owners) {
            info!("[{request_id}] /{name} denied for user {}: {denied}", context.user_id);
            if let Err(e) = interaction.reply(denied.reply_content(), true).await {
                error!("[{request_id}] Failed to send denial for /{name}: {e}");
            }
            return DispatchOutcome::Denied(denied);
        }

        let handler = Arc::clone(&entry.handler);
        let task = tokio::spawn(async move { handler.execute(interaction.as_ref()).await });

        let failure = match task.await {
            Ok(Ok(())) => {
                debug!("[{request_id}] /{name} completed");
                return DispatchOutcome::Completed;
            }
            Ok(Err(e)) => HandlerExecutionError::new(&name, format!("{e:#}")),
            Err(join_error) => HandlerExecutionError::new(&name, panic_message(join_error)),
        };

        error!("[{request_id}] Error handling slash command '{name}': {}", failure.message);
        DispatchOutcome::Failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::InteractionContext;
    use crate::commands::registration::tests::{Put, RecordingRegistrar};
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::model::permissions::Permissions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    const OWNER: UserId = UserId(1);
    const USER: UserId = UserId(2);
    const GUILD: GuildId = GuildId(10);

    struct MockInteraction {
        command: bool,
        context: InteractionContext,
        replies: Mutex<Vec<(String, bool)>>,
    }

    impl MockInteraction {
        fn new(name: &str, user_id: UserId) -> Self {
            Self {
                command: true,
                context: InteractionContext {
                    user_id,
                    guild_id: Some(GUILD),
                    command_name: name.to_string(),
                    member_permissions: Some(Permissions::empty()),
                    bot_permissions: Some(Permissions::empty()),
                },
                replies: Mutex::new(Vec::new()),
            }
        }

        fn bot_permissions(mut self, permissions: Permissions) -> Self {
            self.context.bot_permissions = Some(permissions);
            self
        }

        fn member_permissions(mut self, permissions: Permissions) -> Self {
            self.context.member_permissions = Some(permissions);
            self
        }
    }

    #[async_trait]
    impl Interaction for MockInteraction {
        fn is_command(&self) -> bool {
            self.command
        }

        fn context(&self) -> InteractionContext {
            self.context.clone()
        }

        async fn reply(&self, content: &str, ephemeral: bool) -> Result<()> {
            self.replies.lock().await.push((content.to_string(), ephemeral));
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Reply,
        Fail,
        Panic,
    }

    struct MockCommand {
        definition: CommandDefinition,
        calls: Arc<AtomicUsize>,
        behavior: Behavior,
    }

    #[async_trait]
    impl SlashCommand<MockInteraction> for MockCommand {
        fn definition(&self) -> CommandDefinition {
            self.definition.clone()
        }

        async fn execute(&self, interaction: &MockInteraction) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reply => interaction.reply("done", false).await,
                Behavior::Fail => anyhow::bail!("database unavailable"),
                Behavior::Panic => panic!("handler exploded"),
            }
        }
    }

    fn command(
        definition: CommandDefinition,
        behavior: Behavior,
    ) -> (Arc<dyn SlashCommand<MockInteraction>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(MockCommand {
            definition,
            calls: Arc::clone(&calls),
            behavior,
        });
        (handler, calls)
    }

    fn dispatcher_with(
        handlers: Vec<Arc<dyn SlashCommand<MockInteraction>>>,
    ) -> CommandDispatcher<MockInteraction> {
        let mut dispatcher = CommandDispatcher::new(vec![OWNER], CommandManifest::default());
        dispatcher.load_commands(&handlers);
        dispatcher
    }

    #[test]
    fn test_load_rejects_duplicate_names() {
        let (first, _) = command(CommandDefinition::new("dup", "first"), Behavior::Reply);
        let (second, _) = command(CommandDefinition::new("dup", "second"), Behavior::Reply);
        let mut dispatcher: CommandDispatcher<MockInteraction> =
            CommandDispatcher::new(vec![], CommandManifest::default());

        let report = dispatcher.load_commands(&vec![first, second]);

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].name, "dup");
        assert_eq!(dispatcher.definitions()[0].description, "first");
    }

    #[test]
    fn test_load_skips_malformed() {
        let (bad, _) = command(CommandDefinition::new("", "nameless"), Behavior::Reply);
        let (good, _) = command(CommandDefinition::new("good", "fine"), Behavior::Reply);
        let mut dispatcher: CommandDispatcher<MockInteraction> =
            CommandDispatcher::new(vec![], CommandManifest::default());

        let report = dispatcher.load_commands(&vec![bad, good]);

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_load_applies_manifest() {
        let manifest =
            CommandManifest::from_yaml("commands:\n  test:\n    guilds: [5, 6]\n").unwrap();
        let (handler, _) = command(CommandDefinition::new("test", "test command"), Behavior::Reply);
        let mut dispatcher: CommandDispatcher<MockInteraction> =
            CommandDispatcher::new(vec![], manifest);

        dispatcher.load_commands(&vec![handler]);

        assert_eq!(
            dispatcher.definitions()[0].guilds_to_register,
            vec![GuildId(5), GuildId(6)]
        );
    }

    #[tokio::test]
    async fn test_register_commands_dev_mode_scenario() {
        let (a, _) = command(CommandDefinition::new("a", "global").global(true), Behavior::Reply);
        let (b, _) = command(
            CommandDefinition::new("b", "scoped").guilds([GuildId(7)]),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![b, a]);
        let registrar = RecordingRegistrar::default();

        dispatcher
            .register_commands(&registrar, Some(GuildId(99)))
            .await
            .unwrap();

        // G gets exactly {A, B}; H is never touched in development mode
        assert_eq!(
            registrar.calls.lock().await.clone(),
            vec![Put::Guild(GuildId(99), vec!["a".to_string(), "b".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_register_commands_production() {
        let (a, _) = command(CommandDefinition::new("a", "global").global(true), Behavior::Reply);
        let (b, _) = command(
            CommandDefinition::new("b", "scoped").guilds([GuildId(7)]),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![a, b]);
        let registrar = RecordingRegistrar::default();

        let report = dispatcher.register_commands(&registrar, None).await.unwrap();

        assert_eq!(
            registrar.calls.lock().await.clone(),
            vec![
                Put::Global(vec!["a".to_string()]),
                Put::Guild(GuildId(7), vec!["b".to_string()]),
            ]
        );
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test]
    async fn test_non_command_interaction_ignored() {
        let (handler, calls) = command(CommandDefinition::new("ping", "pong"), Behavior::Reply);
        let dispatcher = dispatcher_with(vec![handler]);
        let mut interaction = MockInteraction::new("ping", USER);
        interaction.command = false;
        let interaction = Arc::new(interaction);

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(outcome, DispatchOutcome::Ignored));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(interaction.replies.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_ignored() {
        let dispatcher = dispatcher_with(vec![]);
        let interaction = Arc::new(MockInteraction::new("missing", USER));

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(outcome, DispatchOutcome::Ignored));
        assert!(interaction.replies.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_owner_only_denies_non_owner_once() {
        let (handler, calls) = command(
            CommandDefinition::new("shutdown", "Stop the bot").owner_only(true),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![handler]);
        let interaction = Arc::new(MockInteraction::new("shutdown", USER));

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Denied(AuthorizationDenied::NotOwner)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            interaction.replies.lock().await.clone(),
            vec![("Only owners can use this command.".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_owner_only_runs_for_owner() {
        let (handler, calls) = command(
            CommandDefinition::new("shutdown", "Stop the bot").owner_only(true),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![handler]);
        let interaction = Arc::new(MockInteraction::new("shutdown", OWNER));

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(outcome, DispatchOutcome::Completed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            interaction.replies.lock().await.clone(),
            vec![("done".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_bot_missing_permission_blocks_handler() {
        let (handler, calls) = command(
            CommandDefinition::new("ban", "Ban a member")
                .required_bot_permissions(Permissions::BAN_MEMBERS),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![handler]);
        let interaction = Arc::new(
            MockInteraction::new("ban", USER).member_permissions(Permissions::BAN_MEMBERS),
        );

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Denied(AuthorizationDenied::BotMissingPermissions(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let replies = interaction.replies.lock().await.clone();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].1, "denial must be ephemeral");
    }

    #[tokio::test]
    async fn test_user_missing_permission_blocks_even_when_bot_has_it() {
        let (handler, calls) = command(
            CommandDefinition::new("ban", "Ban a member")
                .required_bot_permissions(Permissions::BAN_MEMBERS)
                .required_user_permissions(Permissions::KICK_MEMBERS),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![handler]);
        let interaction =
            Arc::new(MockInteraction::new("ban", USER).bot_permissions(Permissions::BAN_MEMBERS));

        let outcome = dispatcher.handle_interaction(Arc::clone(&interaction)).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Denied(AuthorizationDenied::UserMissingPermissions(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            interaction.replies.lock().await.clone(),
            vec![(
                "You don't have enough permissions to execute this command.".to_string(),
                true
            )]
        );
    }

    #[tokio::test]
    async fn test_all_gates_pass() {
        let (handler, calls) = command(
            CommandDefinition::new("ban", "Ban a member")
                .required_bot_permissions(Permissions::BAN_MEMBERS)
                .required_user_permissions(Permissions::BAN_MEMBERS),
            Behavior::Reply,
        );
        let dispatcher = dispatcher_with(vec![handler]);
        let interaction = Arc::new(
            MockInteraction::new("ban", USER)
                .bot_permissions(Permissions::BAN_MEMBERS | Permissions::SEND_MESSAGES)
                .member_permissions(Permissions::BAN_MEMBERS),
        );

        let outcome = dispatcher.handle_interaction(interaction).await;

        assert!(matches!(outcome, DispatchOutcome::Completed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let (failing, _) = command(CommandDefinition::new("broken", "fails"), Behavior::Fail);
        let (healthy, healthy_calls) =
            command(CommandDefinition::new("ping", "pong"), Behavior::Reply);
        let dispatcher = dispatcher_with(vec![failing, healthy]);

        let broken = Arc::new(MockInteraction::new("broken", USER));
        let outcome = dispatcher.handle_interaction(Arc::clone(&broken)).await;

        match outcome {
            DispatchOutcome::Failed(err) => {
                assert_eq!(err.name, "broken");
                assert!(err.message.contains("database unavailable"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // the dispatcher does not reply on the handler's behalf
        assert!(broken.replies.lock().await.is_empty());

        let ping = Arc::new(MockInteraction::new("ping", USER));
        let outcome = dispatcher.handle_interaction(ping).await;
        assert!(matches!(outcome, DispatchOutcome::Completed));
        assert_eq!(healthy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let (panicking, _) = command(CommandDefinition::new("boom", "panics"), Behavior::Panic);
        let dispatcher = dispatcher_with(vec![panicking]);

        let outcome = dispatcher
            .handle_interaction(Arc::new(MockInteraction::new("boom", USER)))
            .await;

        match outcome {
            DispatchOutcome::Failed(err) => assert!(err.message.contains("handler exploded")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

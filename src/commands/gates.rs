//! Authorization gates
//!
//! Ownership, then bot permissions, then user permissions. The first gate
//! that fails decides the outcome; later gates are not evaluated.

use serenity::model::id::UserId;
use serenity::model::permissions::Permissions;

use super::context::InteractionContext;
use super::definition::CommandDefinition;
use crate::core::error::AuthorizationDenied;

/// Run every gate the definition declares against the interaction
pub fn authorize(
    definition: &CommandDefinition,
    context: &InteractionContext,
    owners: &[UserId],
) -> Result<(), AuthorizationDenied> {
    if definition.owner_only && !owners.contains(&context.user_id) {
        return Err(AuthorizationDenied::NotOwner);
    }

    let missing = missing_permissions(definition.required_bot_permissions, context.bot_permissions);
    if !missing.is_empty() {
        return Err(AuthorizationDenied::BotMissingPermissions(missing));
    }

    let missing =
        missing_permissions(definition.required_user_permissions, context.member_permissions);
    if !missing.is_empty() {
        return Err(AuthorizationDenied::UserMissingPermissions(missing));
    }

    Ok(())
}

/// Required permissions not covered by `held`; everything is missing when
/// nothing was resolved
fn missing_permissions(required: Permissions, held: Option<Permissions>) -> Permissions {
    match held {
        Some(held) => required & !held,
        None => required,
    }
}

use std::collections::HashSet;

use crate::domain::{ChannelId, UserId};

// ============== Authorization ==============

/// Users allowed to run moderation actions.
///
/// Membership is the only check: no roles, no expiry, no per-command scoping.
/// An empty set authorizes nobody.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationSet {
    users: HashSet<UserId>,
}

impl AuthorizationSet {
    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserId> for AuthorizationSet {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

pub fn is_authorized(user_id: Option<UserId>, allowed: &AuthorizationSet) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    if allowed.is_empty() {
        return false;
    }
    allowed.contains(user_id)
}

// ============== Ownership / Scope ==============

/// Why a moderation target may not be deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeViolation {
    NotAuthoredByBot,
    OutsideTargetChannel,
}

/// A message may be removed by a moderation action only if the bot wrote it
/// and it lives in the configured target channel.
pub fn check_target_scope(
    author_id: UserId,
    message_channel: ChannelId,
    bot_id: UserId,
    target_channel: ChannelId,
) -> std::result::Result<(), ScopeViolation> {
    if author_id != bot_id {
        return Err(ScopeViolation::NotAuthoredByBot);
    }
    if message_channel != target_channel {
        return Err(ScopeViolation::OutsideTargetChannel);
    }
    Ok(())
}

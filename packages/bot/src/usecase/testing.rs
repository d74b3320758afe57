//! Recording in-process `PlatformGateway` for use case tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::domain::{
    ChannelId, ControlPanel, GatewayError, GuildId, InteractionId, NewVoiceChannel, Permission,
    PermissionOverwrite, PermissionTarget, PermissionValue, PlatformGateway, UserId, UserLimit,
    VoiceChannelState,
};

/// Commands the fake received, in order. Queries are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateVoiceChannel(NewVoiceChannel),
    DeleteChannel(ChannelId),
    SetChannelName(ChannelId, String),
    SetUserLimit(ChannelId, UserLimit),
    SetPermission(ChannelId, PermissionOverwrite),
    MoveMember(UserId, ChannelId),
    DisconnectMember(UserId),
    SendDirectMessage(UserId, String),
    SendMessage(ChannelId, String),
    PostControlPanel(ChannelId, ControlPanel),
    Respond(InteractionId, String),
}

#[derive(Default)]
struct State {
    channels: HashMap<ChannelId, VoiceChannelState>,
    locations: HashMap<UserId, ChannelId>,
    calls: Vec<GatewayCall>,
    next_channel: u64,
    fail_create: bool,
    fail_sends: bool,
    fail_direct_messages: bool,
    fail_moves: bool,
}

/// Keeps a tiny model of channels and member locations so lifecycle flows behave
/// like the real platform.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_channel(&self, channel: &ChannelId, name: &str) {
        self.state().channels.insert(
            channel.clone(),
            VoiceChannelState {
                name: name.to_string(),
                user_limit: UserLimit::UNLIMITED,
                members: Vec::new(),
            },
        );
    }

    /// Move `user` into `channel` (or out of voice), as the platform would on a join/leave.
    pub fn place_member(&self, user: &UserId, channel: Option<&ChannelId>) {
        let mut state = self.state();
        Self::relocate(&mut state, user, channel);
    }

    fn relocate(state: &mut State, user: &UserId, channel: Option<&ChannelId>) {
        if let Some(previous) = state.locations.remove(user)
            && let Some(previous) = state.channels.get_mut(&previous)
        {
            previous.members.retain(|member| member != user);
        }
        if let Some(channel) = channel
            && let Some(target) = state.channels.get_mut(channel)
        {
            target.members.push(user.clone());
            state.locations.insert(user.clone(), channel.clone());
        }
    }

    pub fn fail_create(&self) {
        self.state().fail_create = true;
    }

    pub fn fail_sends(&self) {
        self.state().fail_sends = true;
    }

    pub fn fail_direct_messages(&self) {
        self.state().fail_direct_messages = true;
    }

    pub fn fail_moves(&self) {
        self.state().fail_moves = true;
    }

    pub fn channel(&self, channel: &ChannelId) -> Option<VoiceChannelState> {
        self.state().channels.get(channel).cloned()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn messages_in(&self, channel: &ChannelId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendMessage(target, content) if target == *channel => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn responses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Respond(_, content) => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn panels_in(&self, channel: &ChannelId) -> Vec<ControlPanel> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::PostControlPanel(target, panel) if target == *channel => Some(panel),
                _ => None,
            })
            .collect()
    }

    /// Effective overwrite after replaying every permission command for `channel`.
    pub fn permission(
        &self,
        channel: &ChannelId,
        target: &PermissionTarget,
        permission: Permission,
    ) -> PermissionValue {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SetPermission(on, overwrite)
                    if on == *channel
                        && overwrite.target == *target
                        && overwrite.permission == permission =>
                {
                    Some(overwrite.value)
                }
                _ => None,
            })
            .last()
            .unwrap_or(PermissionValue::Unset)
    }

    /// Commands other than responses to the actor.
    pub fn platform_commands(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, GatewayCall::Respond(..)))
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl PlatformGateway for FakeGateway {
    async fn create_voice_channel(
        &self,
        _guild: &GuildId,
        channel: NewVoiceChannel,
    ) -> Result<ChannelId, GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::CreateVoiceChannel(channel.clone()));
        if state.fail_create {
            return Err(GatewayError::Rejected("Missing Permissions".to_string()));
        }
        state.next_channel += 1;
        let id = ChannelId::new(format!("room-{}", state.next_channel)).unwrap();
        state.channels.insert(
            id.clone(),
            VoiceChannelState {
                name: channel.name,
                user_limit: channel.user_limit,
                members: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn delete_channel(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::DeleteChannel(channel.clone()));
        state.channels.remove(channel);
        state.locations.retain(|_, location| location != channel);
        Ok(())
    }

    async fn channel_state(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<Option<VoiceChannelState>, GatewayError> {
        Ok(self.channel(channel))
    }

    async fn member_voice_channel(
        &self,
        _guild: &GuildId,
        user: &UserId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        Ok(self.state().locations.get(user).cloned())
    }

    async fn set_channel_name(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
        name: &str,
    ) -> Result<(), GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::SetChannelName(channel.clone(), name.to_string()));
        if let Some(target) = state.channels.get_mut(channel) {
            target.name = name.to_string();
        }
        Ok(())
    }

    async fn set_user_limit(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
        limit: UserLimit,
    ) -> Result<(), GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::SetUserLimit(channel.clone(), limit));
        if let Some(target) = state.channels.get_mut(channel) {
            target.user_limit = limit;
        }
        Ok(())
    }

    async fn set_permission(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::SetPermission(channel.clone(), overwrite));
        Ok(())
    }

    async fn move_member(
        &self,
        _guild: &GuildId,
        user: &UserId,
        channel: &ChannelId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::MoveMember(user.clone(), channel.clone()));
        if state.fail_moves {
            return Err(GatewayError::Rejected(
                "Target user is not connected to voice.".to_string(),
            ));
        }
        Self::relocate(&mut state, user, Some(channel));
        Ok(())
    }

    async fn disconnect_member(&self, _guild: &GuildId, user: &UserId) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.calls.push(GatewayCall::DisconnectMember(user.clone()));
        Self::relocate(&mut state, user, None);
        Ok(())
    }

    async fn send_direct_message(&self, user: &UserId, content: &str) -> Result<(), GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::SendDirectMessage(user.clone(), content.to_string()));
        if state.fail_direct_messages {
            return Err(GatewayError::Rejected(
                "Cannot send messages to this user".to_string(),
            ));
        }
        Ok(())
    }

    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), GatewayError> {
        let mut state = self.state();
        state
            .calls
            .push(GatewayCall::SendMessage(channel.clone(), content.to_string()));
        if state.fail_sends {
            return Err(GatewayError::Disconnected);
        }
        Ok(())
    }

    async fn post_control_panel(
        &self,
        channel: &ChannelId,
        panel: &ControlPanel,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::PostControlPanel(channel.clone(), panel.clone()));
        Ok(())
    }

    async fn respond(
        &self,
        interaction: &InteractionId,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::Respond(interaction.clone(), content.to_string()));
        Ok(())
    }
}

/// Let spawned fire-and-forget tasks (operator log) run to completion.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

//! Interactive Parameter Collector
//!
//! ## 責務
//!
//! - ボタン操作の後、操作者が同じチャンネルに投稿する 1 件のメッセージを待つ
//! - 条件に合う最初のメッセージだけを消費し、他のメッセージは無視する
//! - 期限切れは通常の完了として `None` を返す
//!
//! ## 設計ノート
//!
//! 待機中のウィンドウは (guild, channel, author) をキーに `oneshot::Sender` として登録される。
//! `offer` がウィンドウを取り出して送信するため、解決は高々 1 回になる。
//! 待機はイベントごとのタスク内で行われ、他のイベント処理を止めない。

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::sync::oneshot;

use crate::domain::{ChannelId, ChatMessage, GuildId, InputKind, Mention, UserId};

/// Where a window listens and whose messages it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectScope {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
}

/// Value extracted from the qualifying message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectedInput {
    /// Text after `name:`, trimmed and non-empty.
    Name(String),
    /// First user mentioned in the message.
    Target(Mention),
}

struct Window {
    id: u64,
    kind: InputKind,
    sender: oneshot::Sender<CollectedInput>,
}

pub struct InputCollector {
    window: Duration,
    windows: Mutex<HashMap<CollectScope, Window>>,
    next_id: AtomicU64,
}

impl InputCollector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Wait for one qualifying message in `scope`. `None` when the window elapses.
    ///
    /// A newer window for the same scope replaces an older one.
    pub async fn collect(&self, scope: CollectScope, kind: InputKind) -> Option<CollectedInput> {
        let (tx, rx) = oneshot::channel();
        let id = self.allocate_id();
        self.lock_windows().insert(
            scope.clone(),
            Window {
                id,
                kind,
                sender: tx,
            },
        );

        let collected = match tokio::time::timeout(self.window, rx).await {
            Ok(Ok(input)) => Some(input),
            Ok(Err(_)) => None,
            Err(_) => {
                tracing::debug!(
                    "Collection window for {} in {} elapsed",
                    scope.author_id,
                    scope.channel_id
                );
                None
            }
        };

        let mut windows = self.lock_windows();
        if windows.get(&scope).is_some_and(|window| window.id == id) {
            windows.remove(&scope);
        }
        collected
    }

    /// Offer a chat message to the open windows. Returns `true` if it was consumed.
    pub fn offer(&self, message: &ChatMessage) -> bool {
        if message.author_is_bot {
            return false;
        }
        let Some(guild_id) = message.guild_id.clone() else {
            return false;
        };
        let scope = CollectScope {
            guild_id,
            channel_id: message.channel_id.clone(),
            author_id: message.author_id.clone(),
        };

        let mut windows = self.lock_windows();
        let Some(window) = windows.get(&scope) else {
            return false;
        };
        let Some(input) = extract(window.kind, message) else {
            return false;
        };
        match windows.remove(&scope) {
            Some(window) => window.sender.send(input).is_ok(),
            None => false,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn open_windows(&self) -> usize {
        self.lock_windows().len()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_windows(&self) -> std::sync::MutexGuard<'_, HashMap<CollectScope, Window>> {
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

const NAME_PREFIX: &str = "name:";

fn extract(kind: InputKind, message: &ChatMessage) -> Option<CollectedInput> {
    match kind {
        InputKind::NamePrefix => {
            let content = message.content.trim_start();
            let prefix = content.get(..NAME_PREFIX.len())?;
            if !prefix.eq_ignore_ascii_case(NAME_PREFIX) {
                return None;
            }
            let name = content[NAME_PREFIX.len()..].trim();
            (!name.is_empty()).then(|| CollectedInput::Name(name.to_string()))
        }
        InputKind::Mention => message.mentions.first().cloned().map(CollectedInput::Target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn scope() -> CollectScope {
        CollectScope {
            guild_id: GuildId::new("g").unwrap(),
            channel_id: ChannelId::new("panel").unwrap(),
            author_id: UserId::new("alice").unwrap(),
        }
    }

    fn message(author: &str, content: &str, mentions: &[&str]) -> ChatMessage {
        ChatMessage {
            guild_id: Some(GuildId::new("g").unwrap()),
            channel_id: ChannelId::new("panel").unwrap(),
            author_id: UserId::new(author).unwrap(),
            author_is_bot: false,
            content: content.to_string(),
            mentions: mentions
                .iter()
                .map(|id| Mention {
                    user_id: UserId::new(*id).unwrap(),
                    tag: format!("{id}#0001"),
                })
                .collect(),
        }
    }

    /// Start a collection on a separate task and wait until its window is open.
    async fn open(
        collector: &Arc<InputCollector>,
        kind: InputKind,
    ) -> tokio::task::JoinHandle<Option<CollectedInput>> {
        let handle = tokio::spawn({
            let collector = collector.clone();
            async move { collector.collect(scope(), kind).await }
        });
        while collector.open_windows() == 0 {
            tokio::task::yield_now().await;
        }
        handle
    }

    #[tokio::test(start_paused = true)]
    async fn test_name_prefix_is_collected_case_insensitively() {
        // テスト項目: "NAME:" のような大文字の接頭辞でも名前を取り出せる
        // given (前提条件):
        let collector = Arc::new(InputCollector::new(Duration::from_secs(30)));
        let handle = open(&collector, InputKind::NamePrefix).await;

        // when (操作):
        let consumed = collector.offer(&message("alice", "NAME:  Chill Zone ", &[]));

        // then (期待する結果):
        assert!(consumed);
        assert_eq!(
            handle.await.unwrap(),
            Some(CollectedInput::Name("Chill Zone".to_string()))
        );
        assert_eq!(collector.open_windows(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_the_actor_and_matching_messages_are_consumed() {
        // テスト項目: 他人のメッセージや条件外のメッセージは無視される
        // given (前提条件):
        let collector = Arc::new(InputCollector::new(Duration::from_secs(30)));
        let handle = open(&collector, InputKind::Mention).await;

        // when (操作):
        let from_other = collector.offer(&message("mallory", "<@bob>", &["bob"]));
        let without_mention = collector.offer(&message("alice", "hello", &[]));
        let qualifying = collector.offer(&message("alice", "<@bob> <@carol>", &["bob", "carol"]));
        let after_close = collector.offer(&message("alice", "<@dave>", &["dave"]));

        // then (期待する結果):
        assert!(!from_other);
        assert!(!without_mention);
        assert!(qualifying);
        assert!(!after_close);
        match handle.await.unwrap() {
            Some(CollectedInput::Target(mention)) => {
                assert_eq!(mention.user_id, UserId::new("bob").unwrap())
            }
            other => panic!("unexpected collection result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses_without_input() {
        // テスト項目: 期限内に条件を満たすメッセージがなければ None
        // given (前提条件):
        let collector = Arc::new(InputCollector::new(Duration::from_secs(30)));

        // when (操作):
        let result = collector.collect(scope(), InputKind::Mention).await;

        // then (期待する結果):
        assert_eq!(result, None);
        assert_eq!(collector.open_windows(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_name_does_not_close_the_window() {
        // テスト項目: "name:" のみのメッセージは消費されない
        let collector = Arc::new(InputCollector::new(Duration::from_secs(30)));
        let handle = open(&collector, InputKind::NamePrefix).await;

        assert!(!collector.offer(&message("alice", "name:   ", &[])));
        assert!(collector.offer(&message("alice", "name: Lounge", &[])));
        assert_eq!(
            handle.await.unwrap(),
            Some(CollectedInput::Name("Lounge".to_string()))
        );
    }

    #[tokio::test]
    async fn test_bot_messages_are_ignored() {
        // テスト項目: bot の投稿は候補にならない
        let collector = InputCollector::new(Duration::from_secs(30));
        let mut bot = message("alice", "name: x", &[]);
        bot.author_is_bot = true;

        assert!(!collector.offer(&bot));
    }
}

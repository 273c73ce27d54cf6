use leptos::{create_rw_signal, RwSignal, SignalSet, SignalUpdate, SignalWithUntracked};

use crate::api::{ChatMessage, GroupChat, NewMessage, PrivateChat};
use crate::unread::unread_total;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTab {
    Private,
    Group,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Conversation {
    Private(PrivateChat),
    Group(GroupChat),
}

impl Conversation {
    pub fn id(&self) -> u64 {
        match self {
            Conversation::Private(chat) => chat.id,
            Conversation::Group(chat) => chat.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Conversation::Private(chat) => &chat.peer_name,
            Conversation::Group(chat) => &chat.name,
        }
    }

    pub fn avatar(&self) -> Option<&str> {
        match self {
            Conversation::Private(chat) => chat.peer_avatar.as_deref(),
            Conversation::Group(chat) => chat.avatar.as_deref(),
        }
    }

    pub fn last_message(&self) -> Option<&str> {
        match self {
            Conversation::Private(chat) => chat.last_message.as_deref(),
            Conversation::Group(chat) => chat.last_message.as_deref(),
        }
    }

    pub fn unread_count(&self) -> u32 {
        match self {
            Conversation::Private(chat) => chat.unread_count,
            Conversation::Group(chat) => chat.unread_count,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Conversation::Private(_))
    }

    /// Advisory only; the server re-checks posting rights on every message.
    pub fn can_post(&self) -> bool {
        match self {
            Conversation::Private(_) => true,
            Conversation::Group(chat) => !chat.is_admin_only || chat.is_admin,
        }
    }

    pub fn new_message(&self, content: String) -> NewMessage {
        match self {
            Conversation::Private(chat) => NewMessage {
                content,
                private_chat_id: Some(chat.id),
                group_chat_id: None,
            },
            Conversation::Group(chat) => NewMessage {
                content,
                private_chat_id: None,
                group_chat_id: Some(chat.id),
            },
        }
    }
}

/// Ordered history for the selected conversation. Loads are tagged with a
/// generation so a slow response for a previously selected conversation can
/// never overwrite the current one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    generation: u64,
    loading: bool,
    failed: bool,
}

impl MessageLog {
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.messages.clear();
        self.loading = true;
        self.failed = false;
        self.generation
    }

    pub fn finish_load(&mut self, generation: u64, messages: Vec<ChatMessage>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.messages = messages;
        self.loading = false;
        true
    }

    pub fn fail_load(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.failed = true;
        true
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.messages.clear();
        self.loading = false;
        self.failed = false;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }
}

/// Compose field with the optimistic-send contract: the draft is cleared as
/// soon as a send starts and restored verbatim if the send fails.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Composer {
    draft: String,
    in_flight: bool,
}

impl Composer {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns the text to submit, or `None` when there is nothing to send
    /// or a send is already running.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let text = self.draft.trim().to_owned();
        if text.is_empty() {
            return None;
        }
        self.draft.clear();
        self.in_flight = true;
        Some(text)
    }

    pub fn finish_send(&mut self) {
        self.in_flight = false;
    }

    pub fn fail_send(&mut self, submitted: String) {
        self.draft = submitted;
        self.in_flight = false;
    }
}

/// Both conversation lists plus the aggregate unread badge.
#[derive(Clone, Copy)]
pub struct ChatState {
    pub private: RwSignal<Vec<PrivateChat>>,
    pub group: RwSignal<Vec<GroupChat>>,
    pub total_unread: RwSignal<u32>,
}

impl ChatState {
    pub fn new() -> Self {
        ChatState {
            private: create_rw_signal(Vec::new()),
            group: create_rw_signal(Vec::new()),
            total_unread: create_rw_signal(0),
        }
    }

    pub fn recompute_total(&self) {
        let total = self.private.with_untracked(|private| {
            self.group
                .with_untracked(|group| unread_total(private, group))
        });
        self.total_unread.set(total);
    }

    /// Sending implies having seen everything in that conversation: its
    /// unread count drops to zero and its summary becomes the sent text.
    pub fn note_message_sent(&self, conversation: &Conversation, message: &ChatMessage) {
        match conversation {
            Conversation::Private(sent_to) => self.private.update(|list| {
                if let Some(chat) = list.iter_mut().find(|chat| chat.id == sent_to.id) {
                    chat.unread_count = 0;
                    chat.last_message = Some(message.content.clone());
                }
            }),
            Conversation::Group(sent_to) => self.group.update(|list| {
                if let Some(chat) = list.iter_mut().find(|chat| chat.id == sent_to.id) {
                    chat.unread_count = 0;
                    chat.last_message = Some(message.content.clone());
                }
            }),
        }
        self.recompute_total();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leptos::{create_runtime, SignalGetUntracked};

    fn message(id: u64, sender_id: u64, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            sender_id,
            sender_name: "Deniz".to_owned(),
            sender_avatar: None,
            content: content.to_owned(),
            sent_at: Utc::now(),
            is_read: false,
        }
    }

    fn private_chat(id: u64, unread: u32) -> PrivateChat {
        PrivateChat {
            id,
            peer_id: 100 + id,
            peer_name: format!("peer-{id}"),
            peer_avatar: None,
            last_message: None,
            unread_count: unread,
        }
    }

    fn group_chat(id: u64, unread: u32, admin_only: bool, admin: bool) -> GroupChat {
        GroupChat {
            id,
            name: format!("group-{id}"),
            avatar: None,
            chat_type: crate::api::GroupChatType::Discussion,
            is_admin_only: admin_only,
            is_admin: admin,
            last_message: None,
            unread_count: unread,
        }
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut log = MessageLog::default();
        let first = log.begin_load();
        let second = log.begin_load();

        assert!(log.finish_load(second, vec![message(1, 1, "fresh")]));
        assert!(!log.finish_load(first, vec![message(2, 2, "stale")]));

        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].content, "fresh");
        assert!(!log.is_loading());
    }

    #[test]
    fn test_stale_failure_keeps_current_load() {
        let mut log = MessageLog::default();
        let first = log.begin_load();
        let second = log.begin_load();

        assert!(!log.fail_load(first));
        assert!(log.is_loading());
        assert!(!log.has_failed());

        assert!(log.fail_load(second));
        assert!(log.has_failed());
    }

    #[test]
    fn test_clear_invalidates_inflight_load() {
        let mut log = MessageLog::default();
        let generation = log.begin_load();
        log.clear();
        assert!(!log.finish_load(generation, vec![message(1, 1, "late")]));
        assert!(log.is_empty());
    }

    #[test]
    fn test_composer_rejects_blank_and_double_send() {
        let mut composer = Composer::default();
        composer.set_draft("   ".to_owned());
        assert_eq!(composer.begin_send(), None);

        composer.set_draft("  merhaba  ".to_owned());
        assert_eq!(composer.begin_send().as_deref(), Some("merhaba"));
        assert_eq!(composer.draft(), "");

        composer.set_draft("again".to_owned());
        assert_eq!(composer.begin_send(), None, "send already in flight");
    }

    #[test]
    fn test_failed_send_restores_draft() {
        let mut composer = Composer::default();
        composer.set_draft("kamp yarın mı?".to_owned());
        let submitted = composer.begin_send().unwrap();
        composer.fail_send(submitted.clone());

        assert_eq!(composer.draft(), submitted);
        assert!(!composer.in_flight());
    }

    #[test]
    fn test_successful_send_zeroes_unread() {
        let runtime = create_runtime();
        let chats = ChatState::new();
        chats.private.set(vec![private_chat(1, 4), private_chat(2, 1)]);
        chats.group.set(vec![group_chat(9, 2, false, false)]);
        chats.recompute_total();
        assert_eq!(chats.total_unread.get_untracked(), 7);

        let conversation = Conversation::Private(private_chat(1, 4));
        let mut log = MessageLog::default();
        let before = log.len();
        let sent = message(50, 7, "yoldayım");
        log.push(sent.clone());
        chats.note_message_sent(&conversation, &sent);

        assert_eq!(log.len(), before + 1);
        let updated = chats.private.get_untracked();
        assert_eq!(updated[0].unread_count, 0);
        assert_eq!(updated[0].last_message.as_deref(), Some("yoldayım"));
        assert_eq!(chats.total_unread.get_untracked(), 3);
        runtime.dispose();
    }

    #[test]
    fn test_admin_only_group_blocks_non_admins() {
        let locked = Conversation::Group(group_chat(1, 0, true, false));
        let unlocked = Conversation::Group(group_chat(2, 0, true, true));
        let open = Conversation::Group(group_chat(3, 0, false, false));
        let private = Conversation::Private(private_chat(4, 0));

        assert!(!locked.can_post());
        assert!(unlocked.can_post());
        assert!(open.can_post());
        assert!(private.can_post());
    }

    #[test]
    fn test_new_message_targets_one_collection() {
        let private = Conversation::Private(private_chat(3, 0));
        let body = private.new_message("selam".to_owned());
        assert_eq!(body.private_chat_id, Some(3));
        assert_eq!(body.group_chat_id, None);

        let group = Conversation::Group(group_chat(8, 0, false, false));
        let body = group.new_message("selam".to_owned());
        assert_eq!(body.private_chat_id, None);
        assert_eq!(body.group_chat_id, Some(8));
    }
}

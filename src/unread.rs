use std::time::Duration;

use leptos::logging::warn;
use leptos::{on_cleanup, set_interval_with_handle, spawn_local, SignalSet};

use crate::api::{stored_token, Api, GroupChat, PrivateChat};
use crate::state::ChatState;

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

pub fn unread_total(private: &[PrivateChat], group: &[GroupChat]) -> u32 {
    let private: u32 = private.iter().map(|chat| chat.unread_count).sum();
    let group: u32 = group.iter().map(|chat| chat.unread_count).sum();
    private + group
}

/// Replaces whichever lists fetched successfully and recomputes the badge
/// from them merged with the other list's last-known state. A failed fetch
/// leaves the previous state in place.
pub async fn refresh_unread(api: &Api, chats: ChatState) {
    let (private, group) = futures::join!(api.private_chats(), api.group_chats());
    match private {
        Ok(list) => chats.private.set(list),
        Err(err) if err.is_benign() => {}
        Err(err) => warn!("private chat refresh failed: {err}"),
    }
    match group {
        Ok(list) => chats.group.set(list),
        Err(err) if err.is_benign() => {}
        Err(err) => warn!("group chat refresh failed: {err}"),
    }
    chats.recompute_total();
}

/// Refreshes once right away, then every [`POLL_INTERVAL`] while mounted.
/// Each tick re-checks the session token and skips the fetch without one.
pub fn use_unread_poll(api: Api, chats: ChatState) {
    let tick = move || {
        if stored_token().is_none() {
            return;
        }
        let api = api.clone();
        spawn_local(async move {
            refresh_unread(&api, chats).await;
        });
    };
    tick();
    match set_interval_with_handle(tick, POLL_INTERVAL) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => warn!("could not start unread polling: {err:?}"),
    }
}

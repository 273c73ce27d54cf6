use leptos::logging::{log, warn};
use leptos::*;

use crate::api::Api;
use crate::bus::{self, ChatCommand};
use crate::conversation::MessagePane;
use crate::nav::{badge_label, ChatNav};
use crate::state::{ChatState, ChatTab, Conversation, MessageLog};
use crate::unread::use_unread_poll;

fn refresh_category(api: &Api, chats: ChatState, tab: ChatTab) {
    let api = api.clone();
    spawn_local(async move {
        match tab {
            ChatTab::Private => match api.private_chats().await {
                Ok(list) => chats.private.set(list),
                Err(err) if err.is_benign() => {}
                Err(err) => warn!("private chat refresh failed: {err}"),
            },
            ChatTab::Group => match api.group_chats().await {
                Ok(list) => chats.group.set(list),
                Err(err) if err.is_benign() => {}
                Err(err) => warn!("group chat refresh failed: {err}"),
            },
        }
        chats.recompute_total();
    });
}

#[component]
pub fn ChatWidget() -> impl IntoView {
    let api = expect_context::<Api>();
    let chats = ChatState::new();
    provide_context(chats);

    let (open, set_open) = create_signal(false);
    let (tab, set_tab) = create_signal(ChatTab::Private);
    let selection = create_rw_signal(None::<Conversation>);
    let log = create_rw_signal(MessageLog::default());

    use_unread_poll(api.clone(), chats);

    // every selection change reloads the full history; responses are tagged
    // so only the latest selection's load can land
    {
        let api = api.clone();
        create_effect(move |_| {
            let Some(conversation) = selection.get() else {
                log.update(|log| log.clear());
                return;
            };
            let generation = log
                .try_update(|log| log.begin_load())
                .unwrap_or_default();
            let api = api.clone();
            spawn_local(async move {
                let loaded = match &conversation {
                    Conversation::Private(chat) => api.private_messages(chat.id).await,
                    Conversation::Group(chat) => api.group_messages(chat.id).await,
                };
                match loaded {
                    Ok(messages) => {
                        log.update(|log| {
                            log.finish_load(generation, messages);
                        });
                    }
                    Err(err) => {
                        warn!("message load failed: {err}");
                        log.update(|log| {
                            log.fail_load(generation);
                        });
                    }
                }
            });
        });
    }

    // "message this user" buttons elsewhere in the app open the widget
    {
        let api = api.clone();
        bus::on_chat_command(move |command| match command {
            ChatCommand::OpenPrivateChat { chat_id } => {
                set_open.set(true);
                set_tab.set(ChatTab::Private);
                selection.set(None);
                let api = api.clone();
                spawn_local(async move {
                    match api.private_chats().await {
                        Ok(list) => {
                            let found = list.iter().find(|chat| chat.id == chat_id).cloned();
                            chats.private.set(list);
                            chats.recompute_total();
                            match found {
                                Some(chat) => selection.set(Some(Conversation::Private(chat))),
                                None => log!("private chat {chat_id} not in the list, staying put"),
                            }
                        }
                        Err(err) if err.is_benign() => {}
                        Err(err) => warn!("private chat lookup failed: {err}"),
                    }
                });
            }
        });
    }

    let toggle_open = {
        let api = api.clone();
        move |_| {
            let opening = !open.get_untracked();
            set_open.set(opening);
            if opening {
                refresh_category(&api, chats, tab.get_untracked());
            } else {
                selection.set(None);
            }
        }
    };

    let switch_tab = {
        let api = api.clone();
        move |next: ChatTab| {
            if tab.get_untracked() == next {
                return;
            }
            set_tab.set(next);
            selection.set(None);
            refresh_category(&api, chats, next);
        }
    };

    let select_conversation = move |conversation: Conversation| {
        selection.set(Some(conversation));
    };

    let back_to_list = move || selection.set(None);

    view! {
        <div class="fixed bottom-4 right-4 z-40 flex flex-col items-end gap-2">
            {move || {
                open.get()
                    .then(|| {
                        let switch_tab = switch_tab.clone();
                        view! {
                            <section class="w-80 bg-white rounded-lg shadow-lg border dark:bg-gray-800 dark:border-gray-700 overflow-hidden">
                                {move || match selection.get() {
                                    Some(conversation) => view! {
                                        <MessagePane
                                            conversation
                                            log
                                            on_back=back_to_list
                                        />
                                    }
                                    .into_view(),
                                    None => view! {
                                        <ChatNav
                                            tab
                                            on_switch=switch_tab.clone()
                                            on_select=select_conversation
                                        />
                                    }
                                    .into_view(),
                                }}
                            </section>
                        }
                    })
            }}
            <button
                type="button"
                class="relative flex items-center justify-center w-12 h-12 text-white bg-emerald-600 rounded-full shadow-lg hover:bg-emerald-700 focus:outline-none focus:ring-4 focus:ring-emerald-300"
                on:click=toggle_open
            >
                <svg
                    class="w-6 h-6"
                    aria-hidden="true"
                    xmlns="http://www.w3.org/2000/svg"
                    fill="currentColor"
                    viewBox="0 0 20 18"
                >
                    <path d="M18 0H2a2 2 0 0 0-2 2v9a2 2 0 0 0 2 2h2v3.766A1.233 1.233 0 0 0 6.06 17.7l4.26-3.7H18a2 2 0 0 0 2-2V2a2 2 0 0 0-2-2Z" />
                </svg>
                <span class="sr-only">Messages</span>
                {move || {
                    let total = chats.total_unread.get();
                    (total > 0)
                        .then(|| {
                            view! {
                                <span class="absolute -top-1 -right-1 inline-flex items-center justify-center px-1.5 min-w-5 h-5 text-xs font-semibold text-white bg-red-500 rounded-full">
                                    {badge_label(total)}
                                </span>
                            }
                        })
                }}
            </button>
        </div>
    }
}

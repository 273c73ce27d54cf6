use leptos::leptos_dom::ev::SubmitEvent;
use leptos::logging::error;
use leptos::*;

use crate::api::{Api, ChatMessage};
use crate::loading::Loading;
use crate::message::MessageBubble;
use crate::state::{Composer, Conversation, MessageLog};

fn is_own_message(conversation: &Conversation, message: &ChatMessage) -> bool {
    match conversation {
        Conversation::Private(chat) => message.sender_id != chat.peer_id,
        Conversation::Group(_) => false,
    }
}

#[component]
pub fn MessagePane<F>(
    conversation: Conversation,
    log: RwSignal<MessageLog>,
    on_back: F,
) -> impl IntoView
where
    F: Fn() + 'static + Clone,
{
    let api = expect_context::<Api>();
    let chats = expect_context::<crate::state::ChatState>();
    let composer = create_rw_signal(Composer::default());
    let (notice, set_notice) = create_signal(None::<&'static str>);
    let pane_ref = create_node_ref::<html::Main>();

    // pin the view to the newest message on every change
    create_effect(move |_| {
        log.with(|log| log.len());
        request_animation_frame(move || {
            if let Some(pane) = pane_ref.get_untracked() {
                pane.set_scroll_top(pane.scroll_height());
            }
        });
    });

    let update_draft = move |ev| {
        let text = event_target_value(&ev);
        composer.update(|composer| composer.set_draft(text));
    };

    let send_message = {
        let conversation = conversation.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let Some(text) = composer.try_update(|composer| composer.begin_send()).flatten()
            else {
                return;
            };
            set_notice.set(None);
            let api = api.clone();
            let conversation = conversation.clone();
            spawn_local(async move {
                let body = conversation.new_message(text.clone());
                match api.send_message(&body).await {
                    Ok(message) => {
                        log.update(|log| log.push(message.clone()));
                        chats.note_message_sent(&conversation, &message);
                        composer.update(|composer| composer.finish_send());
                    }
                    Err(err) => {
                        error!("message send failed: {err}");
                        composer.update(|composer| composer.fail_send(text));
                        set_notice.set(Some("Your message was not sent. Try again."));
                    }
                }
            });
        }
    };

    let back = {
        let on_back = on_back.clone();
        move |_| on_back()
    };

    let header_title = conversation.title().to_owned();
    let show_receipt = conversation.is_private();
    let body_conversation = conversation.clone();
    let can_post = conversation.can_post();

    view! {
        <div class="flex flex-col h-96 max-h-96">
            <header class="flex items-center gap-2 px-3 py-2 border-b dark:border-gray-700">
                <button
                    type="button"
                    class="p-1 text-gray-500 rounded hover:text-gray-900 dark:text-gray-400 dark:hover:text-white"
                    on:click=back
                >
                    <svg viewBox="0 0 10 10" width="14" aria-hidden="true">
                        <path
                            d="M7 1L2 5l5 4"
                            stroke="currentColor"
                            fill="none"
                            stroke-width="2"
                            stroke-linecap="round"
                        />
                    </svg>
                    <span class="sr-only">Back</span>
                </button>
                <span class="text-sm font-semibold text-gray-900 dark:text-white truncate">
                    {header_title}
                </span>
            </header>
            <main node_ref=pane_ref class="grow overflow-y-auto">
                {move || {
                    log.with(|log| {
                        if log.is_loading() {
                            view! { <Loading /> }.into_view()
                        } else if log.has_failed() {
                            view! {
                                <p class="p-4 text-sm text-gray-500 dark:text-gray-400">
                                    "Messages are unavailable right now."
                                </p>
                            }
                            .into_view()
                        } else {
                            let conversation = body_conversation.clone();
                            log.messages()
                                .iter()
                                .cloned()
                                .map(|message| {
                                    let is_own = is_own_message(&conversation, &message);
                                    view! {
                                        <MessageBubble
                                            message
                                            is_own
                                            show_receipt=show_receipt
                                        />
                                    }
                                })
                                .collect_view()
                        }
                    })
                }}
            </main>
            {move || {
                notice
                    .get()
                    .map(|text| {
                        view! {
                            <p class="px-3 py-1 text-xs text-red-600 dark:text-red-400">{text}</p>
                        }
                    })
            }}
            {if can_post {
                view! {
                    <form class="w-full" on:submit=send_message>
                        <label for="chat-compose" class="sr-only">
                            Your message
                        </label>
                        <div class="flex items-center px-3 py-2 bg-gray-50 dark:bg-gray-700">
                            <input
                                id="chat-compose"
                                class="block p-2.5 w-full text-sm text-gray-900 bg-white rounded-lg border border-gray-300 focus:ring-emerald-500 focus:border-emerald-500 dark:bg-gray-800 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white"
                                placeholder="Your message..."
                                on:input=update_draft
                                prop:value=move || composer.with(|composer| composer.draft().to_owned())
                                prop:disabled=move || composer.with(|composer| composer.in_flight())
                            />
                            <button
                                type="submit"
                                class="inline-flex justify-center p-2 ms-2 text-emerald-600 rounded-full cursor-pointer hover:bg-emerald-100 dark:text-emerald-500 dark:hover:bg-gray-600"
                            >
                                <svg
                                    class="w-5 h-5 rotate-90 rtl:-rotate-90"
                                    aria-hidden="true"
                                    xmlns="http://www.w3.org/2000/svg"
                                    fill="currentColor"
                                    viewBox="0 0 18 20"
                                >
                                    <path d="m17.914 18.594-8-18a1 1 0 0 0-1.828 0l-8 18a1 1 0 0 0 1.157 1.376L8 18.281V9a1 1 0 0 1 2 0v9.281l6.758 1.689a1 1 0 0 0 1.156-1.376Z" />
                                </svg>
                                <span class="sr-only">Send message</span>
                            </button>
                        </div>
                    </form>
                }
                .into_view()
            } else {
                view! {
                    <p class="px-3 py-3 text-sm text-center text-gray-500 bg-gray-50 dark:bg-gray-700 dark:text-gray-400">
                        "Only group admins can post here."
                    </p>
                }
                .into_view()
            }}
        </div>
    }
}

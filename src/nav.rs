use leptos::*;

use crate::api::GroupChatType;
use crate::state::{ChatState, ChatTab, Conversation};

pub fn badge_label(count: u32) -> String {
    if count > 99 {
        "99+".to_owned()
    } else {
        count.to_string()
    }
}

#[component]
fn TabButton<S>(
    label: &'static str,
    target: ChatTab,
    tab: ReadSignal<ChatTab>,
    on_switch: S,
) -> impl IntoView
where
    S: Fn(ChatTab) + 'static + Clone,
{
    let switch = move |_| on_switch(target);
    view! {
        <button
            type="button"
            class="flex-1 py-2 text-sm font-medium border-b-2 text-gray-500 dark:text-gray-400"
            class:border-emerald-500=move || tab.get() == target
            class:text-emerald-600=move || tab.get() == target
            class:border-transparent=move || tab.get() != target
            on:click=switch
        >
            {label}
        </button>
    }
}

#[component]
pub fn ChatNav<S, T>(tab: ReadSignal<ChatTab>, on_switch: S, on_select: T) -> impl IntoView
where
    S: Fn(ChatTab) + 'static + Clone,
    T: Fn(Conversation) + 'static + Clone,
{
    let chats = expect_context::<ChatState>();

    let rows = move || -> Vec<Conversation> {
        match tab.get() {
            ChatTab::Private => chats
                .private
                .get()
                .into_iter()
                .map(Conversation::Private)
                .collect(),
            ChatTab::Group => chats
                .group
                .get()
                .into_iter()
                .map(Conversation::Group)
                .collect(),
        }
    };

    view! {
        <div class="flex flex-col h-96 max-h-96">
            <div class="flex border-b dark:border-gray-700">
                <TabButton label="Private" target=ChatTab::Private tab on_switch=on_switch.clone() />
                <TabButton label="Groups" target=ChatTab::Group tab on_switch />
            </div>
            <div class="py-2 overflow-y-auto grow">
                <ul class="space-y-1 font-medium">
                    {move || {
                        let rows = rows();
                        if rows.is_empty() {
                            return view! {
                                <li class="p-4 text-sm text-center text-gray-500 dark:text-gray-400">
                                    "No conversations yet."
                                </li>
                            }
                            .into_view();
                        }
                        rows.into_iter()
                            .map(|conversation| {
                                let select = on_select.clone();
                                let title = conversation.title().to_owned();
                                let summary = conversation.last_message().unwrap_or("").to_owned();
                                let unread = conversation.unread_count();
                                let initial = title.chars().next().unwrap_or('?');
                                let avatar = conversation.avatar().map(str::to_owned);
                                let announcement = matches!(
                                    &conversation,
                                    Conversation::Group(chat) if chat.chat_type == GroupChatType::Announcement
                                );
                                let onclick = move |ev: ev::MouseEvent| {
                                    ev.prevent_default();
                                    select(conversation.clone());
                                };
                                view! {
                                    <li on:click=onclick>
                                        <a
                                            href="#"
                                            class="flex items-center gap-3 px-3 py-2 text-gray-900 rounded-lg dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700 group"
                                        >
                                            {match avatar {
                                                Some(avatar) => view! {
                                                    <img class="w-8 h-8 rounded-full" src=avatar alt="" />
                                                }
                                                .into_view(),
                                                None => view! {
                                                    <span class="flex items-center justify-center w-8 h-8 rounded-full bg-emerald-200 text-emerald-800 text-sm font-semibold">
                                                        {initial}
                                                    </span>
                                                }
                                                .into_view(),
                                            }}
                                            <span class="flex flex-col min-w-0 grow text-left">
                                                <span class="flex items-center gap-1 text-sm truncate">
                                                    {title}
                                                    {announcement
                                                        .then(|| {
                                                            view! {
                                                                <span class="text-[10px] uppercase text-amber-600 dark:text-amber-400">
                                                                    "announcement"
                                                                </span>
                                                            }
                                                        })}
                                                </span>
                                                <span class="text-xs text-gray-500 dark:text-gray-400 truncate">
                                                    {summary}
                                                </span>
                                            </span>
                                            {(unread > 0)
                                                .then(|| {
                                                    view! {
                                                        <span class="inline-flex items-center justify-center px-1.5 min-w-5 h-5 text-xs font-semibold text-white bg-emerald-600 rounded-full">
                                                            {badge_label(unread)}
                                                        </span>
                                                    }
                                                })}
                                        </a>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_caps_at_99() {
        assert_eq!(badge_label(0), "0");
        assert_eq!(badge_label(42), "42");
        assert_eq!(badge_label(99), "99");
        assert_eq!(badge_label(100), "99+");
    }
}

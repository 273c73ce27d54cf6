use chrono::{DateTime, Local};
use leptos::*;
use pulldown_cmark::Event;

use crate::api::ChatMessage;

/// Message bodies are markdown, but anything the author wrote as raw HTML
/// is demoted to text so it ends up escaped in the output.
pub fn render_markdown(content: &str) -> String {
    let parser = pulldown_cmark::Parser::new(content).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

#[component]
pub fn MessageBubble(message: ChatMessage, is_own: bool, show_receipt: bool) -> impl IntoView {
    let parsed = render_markdown(&message.content);
    let timestamp = format!(
        "{}",
        DateTime::<Local>::from(message.sent_at).format("%H:%M")
    );
    let receipt = (is_own && show_receipt).then(|| {
        if message.is_read {
            "Read"
        } else {
            "Delivered"
        }
    });
    let initial = message.sender_name.chars().next().unwrap_or('?');
    view! {
        <div class="flex items-start m-3 gap-2.5" class:flex-row-reverse=move || is_own>
            {match message.sender_avatar.clone() {
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
            <div class="flex flex-col gap-1 max-w-[85%]">
                <div class="flex items-center space-x-2 rtl:space-x-reverse">
                    <span class="text-sm font-semibold text-gray-900 dark:text-white">
                        {&message.sender_name}
                    </span>
                    <span class="text-xs font-normal text-gray-500 dark:text-gray-400">
                        {&timestamp}
                    </span>
                </div>
                <div class="flex flex-col leading-1.5 p-3 border-gray-200 bg-gray-100 rounded-e-xl rounded-es-xl dark:bg-gray-700">
                    <p class="text-sm font-normal text-gray-900 dark:text-white">
                        <div inner_html=parsed />
                    </p>
                </div>
                {receipt
                    .map(|caption| {
                        view! {
                            <span class="text-xs font-normal text-gray-500 dark:text-gray-400">
                                {caption}
                            </span>
                        }
                    })}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown() {
        let html = render_markdown("hello world");
        assert_eq!(&html, "<p>hello world</p>\n");

        let html = render_markdown("take the **left** fork after the bridge");
        assert_eq!(
            &html,
            "<p>take the <strong>left</strong> fork after the bridge</p>\n"
        );
    }

    #[test]
    fn test_markdown_neutralizes_raw_html() {
        let html = render_markdown("hi <img src=x onerror=alert(1)> there");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));

        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }
}

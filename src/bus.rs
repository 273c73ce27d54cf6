use leptos::logging::{error, warn};
use leptos::{ev, window, window_event_listener};
use serde::{Deserialize, Serialize};
use web_sys::{CustomEvent, CustomEventInit};

/// Name of the browser event carrying [`ChatCommand`] payloads. Other pages
/// of the application (profile "message this user" buttons, admin tools)
/// dispatch it; the chat widget listens.
pub const CHAT_COMMAND_EVENT: &str = "routecraft:chat-command";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatCommand {
    #[serde(rename_all = "camelCase")]
    OpenPrivateChat { chat_id: u64 },
}

pub fn dispatch(command: ChatCommand) {
    let detail = match serde_wasm_bindgen::to_value(&command) {
        Ok(detail) => detail,
        Err(err) => {
            error!("chat command did not encode: {err}");
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    init.set_bubbles(false);
    match CustomEvent::new_with_event_init_dict(CHAT_COMMAND_EVENT, &init) {
        Ok(event) => {
            let _ = window().dispatch_event(&event);
        }
        Err(err) => error!("chat command did not dispatch: {err:?}"),
    }
}

/// Subscribes for the lifetime of the current reactive scope. Payloads that
/// fail to decode are logged and dropped.
pub fn on_chat_command(callback: impl Fn(ChatCommand) + 'static) {
    window_event_listener(
        ev::Custom::<CustomEvent>::new(CHAT_COMMAND_EVENT),
        move |event| match serde_wasm_bindgen::from_value(event.detail()) {
            Ok(command) => callback(command),
            Err(err) => warn!("ignoring malformed chat command: {err}"),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_value(ChatCommand::OpenPrivateChat { chat_id: 42 }).unwrap();
        assert_eq!(json["type"], "openPrivateChat");
        assert_eq!(json["chatId"], 42);

        let parsed: ChatCommand =
            serde_json::from_str(r#"{"type":"openPrivateChat","chatId":42}"#).unwrap();
        assert_eq!(parsed, ChatCommand::OpenPrivateChat { chat_id: 42 });
    }
}

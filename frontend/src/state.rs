use cofounder_protocol::{Conversation, StreamError};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::AbortController;

use crate::api;
use crate::models::Panel;

/// Shown in place of a reply when the exchange fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Shared application state, provided via Leptos context.
#[derive(Clone)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub conversation: ReadSignal<Conversation>,
    pub is_streaming: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,
    pub panel: ReadSignal<Panel>,

    // --- Write signals (for mutating state) ---
    pub set_conversation: WriteSignal<Conversation>,
    pub set_is_streaming: WriteSignal<bool>,
    pub set_error: WriteSignal<Option<String>>,
    pub set_panel: WriteSignal<Panel>,

    // Controller of the request currently streaming, if any.
    abort: StoredValue<Option<AbortController>, LocalStorage>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (conversation, set_conversation) = signal(Conversation::new());
        let (is_streaming, set_is_streaming) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (panel, set_panel) = signal(Panel::Chat);

        let state = Self {
            conversation,
            is_streaming,
            error,
            panel,
            set_conversation,
            set_is_streaming,
            set_error,
            set_panel,
            abort: StoredValue::new_local(None),
        };

        provide_context(state.clone());
        state
    }

    /// Send a message and stream the reply into the conversation.
    pub fn send_message(&self, text: String) {
        if self.is_streaming.get_untracked() {
            return;
        }

        let controller = match AbortController::new() {
            Ok(controller) => controller,
            Err(e) => {
                log::error!("Failed to create abort controller: {e:?}");
                return;
            }
        };
        let signal = controller.signal();
        self.abort.set_value(Some(controller));

        self.set_conversation.update(|c| {
            c.begin_exchange(text);
        });
        let history = self.conversation.with_untracked(Conversation::history);
        self.set_is_streaming.set(true);
        self.set_error.set(None);

        let state = self.clone();
        spawn_local(async move {
            let token = api::auth_token();
            let set_conversation = state.set_conversation;
            let result = api::stream_chat(&history, token.as_deref(), &signal, |content| {
                set_conversation.update(|c| {
                    c.publish_assistant(content);
                });
            })
            .await;

            match result {
                Ok(_) | Err(StreamError::Cancelled) => {
                    set_conversation.update(Conversation::finish_exchange);
                }
                Err(e) => {
                    log::error!("Chat error: {e}");
                    if let StreamError::Http { status: 401, .. } = e {
                        state.set_error.set(Some("Please sign in again.".to_string()));
                    }
                    set_conversation.update(|c| {
                        c.fail_exchange(FALLBACK_REPLY);
                    });
                }
            }

            state.abort.set_value(None);
            state.set_is_streaming.set(false);
        });
    }

    /// Stop the reply currently streaming; what arrived so far is kept.
    pub fn stop(&self) {
        self.abort.with_value(|controller| {
            if let Some(controller) = controller {
                controller.abort();
            }
        });
    }

    /// Drop the whole conversation and start over.
    pub fn reset(&self) {
        self.stop();
        self.set_conversation.update(Conversation::reset);
        self.set_error.set(None);
    }
}

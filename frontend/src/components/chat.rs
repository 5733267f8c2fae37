use cofounder_protocol::Role;
use leptos::ev;
use leptos::prelude::*;

use crate::state::AppState;

/// Main chat area with message history and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();
    let conversation = state.conversation;
    let is_empty = Memo::new(move |_| conversation.with(|c| c.is_empty()));

    view! {
        <main class="chat-area">
            // Error banner
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner">{err}</div>
                    }
                })
            }}

            <div class="chat-header">"AI Co-founder"</div>

            // Messages
            <div class="messages-container">
                {move || {
                    if is_empty.get() {
                        view! {
                            <div class="empty-state">
                                <p>"Start a conversation with your AI co-founder"</p>
                                <p class="hint">
                                    "Ask about business strategy, product development, or any startup-related questions."
                                </p>
                            </div>
                        }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || conversation.with(|c| c.messages().to_vec())
                                key=|m| m.id.clone()
                                let:msg
                            >
                                <MessageBubble
                                    id=msg.id.clone()
                                    role=msg.role
                                    time=msg.timestamp.format("%H:%M").to_string()
                                />
                            </For>
                        }.into_any()
                    }
                }}
            </div>

            <ChatInput />
        </main>
    }
}

/// A single chat message bubble. Content is looked up by id so the in-flight
/// reply re-renders in place as it grows.
#[component]
fn MessageBubble(id: String, role: Role, time: String) -> impl IntoView {
    let state = expect_context::<AppState>();
    let conversation = state.conversation;
    let css_class = if role == Role::User {
        "message user"
    } else {
        "message assistant"
    };
    let streaming = {
        let id = id.clone();
        move || {
            state.is_streaming.get()
                && conversation.with(|c| {
                    c.current_exchange_assistant_message()
                        .is_some_and(|m| m.id == id)
                })
        }
    };
    let content = move || {
        conversation.with(|c| {
            c.messages()
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        })
    };

    view! {
        <div class=css_class>
            <div class="role-label">{role.as_str()}" · "{time}</div>
            <div class=("streaming-cursor", streaming)>{content}</div>
        </div>
    }
}

/// Chat input with send and stop buttons.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.is_streaming.get();

    let send = {
        let state = state.clone();
        move || {
            let text = input.get().trim().to_string();
            if text.is_empty() || is_sending() {
                return;
            }
            set_input.set(String::new());
            state.send_message(text);
        }
    };

    let send_clone = send.clone();
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_clone();
        }
    };

    let on_submit = move |_: ev::MouseEvent| {
        send();
    };

    let on_stop = move |_: ev::MouseEvent| {
        state.stop();
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type your message… (Enter to send, Shift+Enter for newline)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <Show
                    when=is_sending
                    fallback=move || {
                        let on_submit = on_submit.clone();
                        view! {
                            <button
                                class="send-btn"
                                on:click=on_submit
                                disabled=move || input.get().trim().is_empty()
                            >
                                "Send"
                            </button>
                        }
                    }
                >
                    <button class="stop-btn" on:click=on_stop.clone()>
                        "Stop"
                    </button>
                </Show>
            </div>
        </div>
    }
}

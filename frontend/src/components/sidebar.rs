use leptos::prelude::*;

use crate::models::Panel;
use crate::state::AppState;

/// Sidebar with panel navigation and "New Chat" button.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_new = {
        let state = state.clone();
        move |_| {
            state.reset();
            state.set_panel.set(Panel::Chat);
        }
    };

    let nav_item = move |panel: Panel, label: &'static str| {
        view! {
            <div
                class="conversation-item"
                class:active=move || state.panel.get() == panel
                on:click=move |_| state.set_panel.set(panel)
            >
                {label}
            </div>
        }
    };

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"AI Co-founder"</h2>
                <button class="new-chat-btn" on:click=on_new>
                    "+ New Chat"
                </button>
            </div>
            <div class="conversation-list">
                {nav_item(Panel::Chat, "Chat")}
                {nav_item(Panel::Ideas, "Idea Generator")}
                {nav_item(Panel::Documents, "Documents")}
                {nav_item(Panel::Code, "Code Builder")}
            </div>
        </aside>
    }
}

mod api;
mod components;
mod models;
mod state;

use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::chat::ChatArea;
use components::code::CodeBuilder;
use components::documents::DocumentGenerator;
use components::idea::IdeaGenerator;
use components::sidebar::Sidebar;
use models::Panel;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    view! {
        <div class="app-container">
            <Sidebar />
            {move || match state.panel.get() {
                Panel::Chat => view! { <ChatArea /> }.into_any(),
                Panel::Ideas => view! { <IdeaGenerator /> }.into_any(),
                Panel::Documents => view! { <DocumentGenerator /> }.into_any(),
                Panel::Code => view! { <CodeBuilder /> }.into_any(),
            }}
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}

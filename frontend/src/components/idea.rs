use cofounder_protocol::StreamError;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::status::FailureBanner;
use crate::models::{GeneratedIdea, IdeaForm};

/// Form that asks the backend for one structured startup idea.
#[component]
pub fn IdeaGenerator() -> impl IntoView {
    let (industry, set_industry) = signal(String::new());
    let (target_market, set_target_market) = signal(String::new());
    let (technology, set_technology) = signal(String::new());
    let (problem_space, set_problem_space) = signal(String::new());
    let (is_generating, set_is_generating) = signal(false);
    let (error, set_error) = signal(None::<StreamError>);
    let (idea, set_idea) = signal(None::<GeneratedIdea>);

    let form = move || IdeaForm {
        industry: industry.get().trim().to_string(),
        target_market: target_market.get().trim().to_string(),
        technology: technology
            .get()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        problem_space: problem_space.get(),
    };

    let generate = move || {
        let form = form();
        if !form.is_complete() || is_generating.get_untracked() {
            return;
        }
        set_is_generating.set(true);
        set_error.set(None);
        spawn_local(async move {
            let token = api::auth_token();
            match api::generate_idea(&form, token.as_deref()).await {
                Ok(generated) => set_idea.set(Some(generated)),
                Err(e) => {
                    log::error!("Idea generation failed: {e}");
                    set_error.set(Some(e));
                }
            }
            set_is_generating.set(false);
        });
    };

    view! {
        <main class="chat-area">
            <div class="chat-header">"Generate a startup idea"</div>
            <FailureBanner error=error on_retry=Callback::new(move |()| generate()) />
            <div class="idea-form">
                <input
                    placeholder="Industry"
                    prop:value=industry
                    on:input=move |ev| set_industry.set(event_target_value(&ev))
                />
                <input
                    placeholder="Target market"
                    prop:value=target_market
                    on:input=move |ev| set_target_market.set(event_target_value(&ev))
                />
                <input
                    placeholder="Technologies (comma separated)"
                    prop:value=technology
                    on:input=move |ev| set_technology.set(event_target_value(&ev))
                />
                <textarea
                    placeholder="What problem should the idea solve?"
                    prop:value=problem_space
                    on:input=move |ev| set_problem_space.set(event_target_value(&ev))
                />
                <button
                    class="send-btn"
                    on:click=move |_| generate()
                    disabled=move || is_generating.get() || !form().is_complete()
                >
                    {move || if is_generating.get() { "Generating…" } else { "Generate idea" }}
                </button>
            </div>
            {move || idea.get().map(|idea| view! { <IdeaCard idea=idea /> })}
        </main>
    }
}

#[component]
fn IdeaCard(idea: GeneratedIdea) -> impl IntoView {
    let list = |items: Vec<String>| {
        items
            .into_iter()
            .map(|item| view! { <li>{item}</li> })
            .collect_view()
    };

    view! {
        <div class="idea-card">
            <h3>{idea.name}</h3>
            <p class="hint">{idea.pitch}</p>
            <p>{idea.description}</p>
            <h4>"Key features"</h4>
            <ul>{list(idea.key_features)}</ul>
            <h4>"Target audience"</h4>
            <p>{idea.target_audience}</p>
            <h4>"Revenue model"</h4>
            <p>{idea.revenue_model}</p>
            <h4>"Challenges"</h4>
            <ul>{list(idea.challenges)}</ul>
            <h4>"Growth strategy"</h4>
            <p>{idea.growth_strategy}</p>
        </div>
    }
}

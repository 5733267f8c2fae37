use cofounder_protocol::StreamError;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::AbortController;

use crate::api;
use crate::components::status::FailureBanner;
use crate::models::{CodeForm, CodeTemplate, CODE_TEMPLATES};

/// Template picker that streams generated code into a preview pane.
#[component]
pub fn CodeBuilder() -> impl IntoView {
    let (selected, set_selected) = signal(None::<CodeTemplate>);
    let (extra_features, set_extra_features) = signal(String::new());
    let (output, set_output) = signal(String::new());
    let (is_generating, set_is_generating) = signal(false);
    let (error, set_error) = signal(None::<StreamError>);
    let abort = StoredValue::new_local(None::<AbortController>);

    let generate = move || {
        let Some(template) = selected.get_untracked() else {
            return;
        };
        if is_generating.get_untracked() {
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
        abort.set_value(Some(controller));

        let form = CodeForm::from_template(&template, &extra_features.get_untracked());
        set_output.set(String::new());
        set_error.set(None);
        set_is_generating.set(true);

        spawn_local(async move {
            let token = api::auth_token();
            let result = api::stream_code(&form, token.as_deref(), &signal, |content| {
                set_output.set(content.to_string());
            })
            .await;

            match result {
                Ok(_) | Err(StreamError::Cancelled) => {}
                Err(e) => {
                    log::error!("Code generation failed: {e}");
                    set_error.set(Some(e));
                }
            }
            abort.set_value(None);
            set_is_generating.set(false);
        });
    };

    let stop = move |_| {
        abort.with_value(|controller| {
            if let Some(controller) = controller {
                controller.abort();
            }
        });
    };

    let templates = CODE_TEMPLATES
        .into_iter()
        .map(|template| {
            view! {
                <div
                    class="template-card"
                    class:active=move || selected.get() == Some(template)
                    on:click=move |_| set_selected.set(Some(template))
                >
                    <h3>{template.name}</h3>
                    <p>{template.description}</p>
                    <p class="hint">{template.tech_stack.join(", ")}</p>
                </div>
            }
        })
        .collect_view();

    view! {
        <main class="chat-area">
            <div class="chat-header">"Code builder"</div>
            <FailureBanner error=error on_retry=Callback::new(move |()| generate()) />
            <div class="template-list">{templates}</div>
            <div class="input-row">
                <input
                    placeholder="Extra features (comma separated)"
                    prop:value=extra_features
                    on:input=move |ev| set_extra_features.set(event_target_value(&ev))
                />
                <Show
                    when=move || is_generating.get()
                    fallback=move || {
                        view! {
                            <button
                                class="send-btn"
                                on:click=move |_| generate()
                                disabled=move || selected.get().is_none()
                            >
                                "Generate code"
                            </button>
                        }
                    }
                >
                    <button class="stop-btn" on:click=stop>
                        "Stop"
                    </button>
                </Show>
            </div>
            <pre class=move || {
                if is_generating.get() { "code-output streaming-cursor" } else { "code-output" }
            }>
                {move || output.get()}
            </pre>
        </main>
    }
}

use cofounder_protocol::StreamError;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::status::FailureBanner;
use crate::models::{BusinessInfo, DocumentForm, DocumentKind, GeneratedDocument, TONES};

const STAGES: [(&str, &str); 5] = [
    ("idea", "Idea Stage"),
    ("mvp", "MVP"),
    ("early", "Early Stage"),
    ("growth", "Growth Stage"),
    ("scale", "Scale-up"),
];

/// Business document form; generated documents are listed newest first.
#[component]
pub fn DocumentGenerator() -> impl IntoView {
    let (kind, set_kind) = signal(DocumentKind::default());
    let (name, set_name) = signal(String::new());
    let (industry, set_industry) = signal(String::new());
    let (stage, set_stage) = signal(STAGES[0].0.to_string());
    let (audience, set_audience) = signal(String::new());
    let (purpose, set_purpose) = signal(String::new());
    let (tone, set_tone) = signal(TONES[0].to_string());
    let (is_generating, set_is_generating) = signal(false);
    let (error, set_error) = signal(None::<StreamError>);
    let (documents, set_documents) = signal(Vec::<GeneratedDocument>::new());

    let form = move || DocumentForm {
        kind: kind.get(),
        business_info: BusinessInfo {
            name: name.get(),
            industry: industry.get(),
            stage: stage.get(),
            target: audience.get(),
        },
        audience: audience.get(),
        purpose: purpose.get(),
        tone: tone.get(),
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
            match api::generate_document(&form, token.as_deref()).await {
                Ok(document) => set_documents.update(|docs| docs.insert(0, document)),
                Err(e) => {
                    log::error!("Document generation failed: {e}");
                    set_error.set(Some(e));
                }
            }
            set_is_generating.set(false);
        });
    };

    let kinds = DocumentKind::ALL
        .into_iter()
        .map(|k| view! { <option value=k.value() selected=move || kind.get() == k>{k.label()}</option> })
        .collect_view();
    let stages = STAGES
        .into_iter()
        .map(|(value, label)| view! { <option value=value>{label}</option> })
        .collect_view();
    let tones = TONES
        .into_iter()
        .map(|t| view! { <option value=t>{t}</option> })
        .collect_view();

    view! {
        <main class="chat-area">
            <div class="chat-header">"Business documents"</div>
            <FailureBanner error=error on_retry=Callback::new(move |()| generate()) />
            <div class="idea-form">
                <select on:change=move |ev| {
                    set_kind.set(DocumentKind::from_value(&event_target_value(&ev)).unwrap_or_default())
                }>{kinds}</select>
                <input
                    placeholder="Business name"
                    prop:value=name
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <input
                    placeholder="Industry"
                    prop:value=industry
                    on:input=move |ev| set_industry.set(event_target_value(&ev))
                />
                <select on:change=move |ev| set_stage.set(event_target_value(&ev))>{stages}</select>
                <input
                    placeholder="Target audience"
                    prop:value=audience
                    on:input=move |ev| set_audience.set(event_target_value(&ev))
                />
                <textarea
                    placeholder="What is the document for?"
                    prop:value=purpose
                    on:input=move |ev| set_purpose.set(event_target_value(&ev))
                />
                <select on:change=move |ev| set_tone.set(event_target_value(&ev))>{tones}</select>
                <button
                    class="send-btn"
                    on:click=move |_| generate()
                    disabled=move || is_generating.get() || !form().is_complete()
                >
                    {move || if is_generating.get() { "Generating…" } else { "Generate document" }}
                </button>
            </div>
            {move || {
                documents
                    .get()
                    .into_iter()
                    .map(|doc| {
                        view! {
                            <div class="idea-card">
                                <h3>{doc.kind.label()}</h3>
                                <p class="hint">{doc.timestamp}</p>
                                <pre class="document-body">{doc.document}</pre>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </main>
    }
}

use cofounder_protocol::StreamError;
use leptos::prelude::*;

/// Error banner; transient failures get a retry button.
#[component]
pub fn FailureBanner(error: ReadSignal<Option<StreamError>>, on_retry: Callback<()>) -> impl IntoView {
    move || {
        error.get().map(|e| {
            let retry = e.is_retryable().then(|| {
                view! {
                    <button class="retry-btn" on:click=move |_| on_retry.run(())>
                        "Retry"
                    </button>
                }
            });
            view! {
                <div class="error-banner">
                    {e.to_string()}
                    {retry}
                </div>
            }
        })
    }
}

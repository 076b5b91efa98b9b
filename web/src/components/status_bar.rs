use leptos::prelude::*;
use thaw::{Label, LabelSize, MessageBar, MessageBarIntent};

use crate::search::panel::count_label;
use crate::search::{Status, StatusTone};

fn intent_for(tone: StatusTone) -> MessageBarIntent {
    match tone {
        StatusTone::Info => MessageBarIntent::Info,
        StatusTone::Success => MessageBarIntent::Success,
        StatusTone::Error => MessageBarIntent::Error,
    }
}

#[component]
pub fn StatusBar(status: RwSignal<Status>, count: RwSignal<usize>) -> impl IntoView {
    view! {
        <div class="status-bar">
            {move || {
                let Status { message, tone } = status.get();
                view! {
                    <MessageBar intent=intent_for(tone)>{message}</MessageBar>
                }
            }}
            <Label size=LabelSize::Large>{move || count_label(count.get())}</Label>
        </div>
    }
}

use futures::channel::mpsc;
use leptos::ev::SubmitEvent;
use leptos::logging::warn;
use leptos::prelude::*;

use crate::components::status_bar::StatusBar;
use crate::config::DEFAULT_RANGE_METERS;
use crate::search::{Command, ResultList, SearchForm, SearchPanel, Status};
use crate::views::map::{CommandChannel, SearchMap};

/// [`SearchPanel`] backed by reactive signals.
#[derive(Debug, Clone, Copy)]
pub struct SignalPanel {
    pub entity: RwSignal<String>,
    pub range: RwSignal<String>,
    pub status: RwSignal<Status>,
    pub count: RwSignal<usize>,
    pub results: RwSignal<Vec<String>>,
}

impl SignalPanel {
    pub fn new() -> Self {
        Self {
            entity: RwSignal::new(String::new()),
            range: RwSignal::new(DEFAULT_RANGE_METERS.to_string()),
            status: RwSignal::new(Status::info("Carregando mapa...")),
            count: RwSignal::new(0),
            results: RwSignal::new(Vec::new()),
        }
    }
}

impl Default for SignalPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchPanel for SignalPanel {
    fn read_form(&self) -> SearchForm {
        SearchForm {
            entity: self.entity.get_untracked(),
            range: self.range.get_untracked(),
        }
    }

    fn set_entity_input(&self, entity: &str) {
        self.entity.set(entity.to_string());
    }

    fn set_status(&self, status: Status) {
        self.status.set(status);
    }

    fn set_count(&self, count: usize) {
        self.count.set(count);
    }

    fn clear_results(&self) {
        self.results.set(Vec::new());
    }

    fn show_results(&self, results: ResultList) {
        self.results.set(results.lines());
    }
}

#[component]
pub fn SearchPage() -> impl IntoView {
    let panel = SignalPanel::new();
    let (sender, receiver) = mpsc::unbounded::<Command>();

    let submit_sender = sender.clone();
    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if let Err(err) = submit_sender.unbounded_send(Command::Submit) {
            warn!("Search command dropped: {}", err);
        }
    };

    view! {
        <div class="search-page">
            <aside class="search-sidebar">
                <h1 class="search-title">"GeoSearch"</h1>
                <form class="search-form" on:submit=on_submit>
                    <label class="search-field">
                        <span>"Entidade"</span>
                        <input
                            type="text"
                            id="entity-input"
                            placeholder="Ex.: Copacabana"
                            bind:value=panel.entity
                        />
                    </label>
                    <label class="search-field">
                        <span>"Raio (metros)"</span>
                        <input
                            type="number"
                            id="range-input"
                            min="1"
                            step="1"
                            bind:value=panel.range
                        />
                    </label>
                    <button type="submit" class="search-submit">"Buscar"</button>
                </form>

                <StatusBar status=panel.status count=panel.count />

                <ul class="results-list">
                    {move || {
                        panel
                            .results
                            .get()
                            .into_iter()
                            .map(|line| view! { <li>{line}</li> })
                            .collect_view()
                    }}
                </ul>
            </aside>

            <SearchMap panel=panel commands=CommandChannel { sender, receiver } />
        </div>
    }
}

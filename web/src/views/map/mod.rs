#[cfg(feature = "hydrate")]
mod geolocation;
#[cfg(feature = "hydrate")]
mod leaflet_surface;

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender};
use leptos::prelude::*;

use crate::components::loading::LoadingView;
use crate::search::Command;
use crate::views::search_page::SignalPanel;

#[cfg(feature = "hydrate")]
use leptos_leaflet::prelude::*;

#[cfg(feature = "hydrate")]
use crate::config::{DEFAULT_CENTER, DEFAULT_ZOOM, TILE_ATTRIBUTION, TILE_URL};

/// Both ends of the page's command queue. The map keeps the sender to
/// forward pointer events and drains the receiver into the controller.
pub struct CommandChannel {
    pub sender: UnboundedSender<Command>,
    pub receiver: UnboundedReceiver<Command>,
}

#[component]
pub fn SearchMap(panel: SignalPanel, commands: CommandChannel) -> impl IntoView {
    let map_ready = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    let map = JsRwSignal::new_local(None::<leptos_leaflet::leaflet::Map>);

    #[cfg(feature = "hydrate")]
    {
        use std::{cell::RefCell, rc::Rc};
        use wasm_bindgen::JsCast;

        // Mount the map after hydration finished
        Effect::new(move |_| {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Err(err) = window.request_animation_frame(
                wasm_bindgen::closure::Closure::once_into_js(move || {
                    map_ready.set(true);
                })
                .as_ref()
                .unchecked_ref(),
            ) {
                leptos::logging::warn!("Could not schedule map mount: {:?}", err);
            }
        });

        let pending = Rc::new(RefCell::new(Some(commands)));
        Effect::new(move |_| {
            let Some(map_instance) = map.get() else {
                return;
            };
            let Some(commands) = pending.borrow_mut().take() else {
                return;
            };
            start_controller(map_instance, panel, commands);
        });
    }

    #[cfg(not(feature = "hydrate"))]
    let _ = (panel, commands);

    view! {
        <div class="search-map">
            {move || {
                #[cfg(feature = "hydrate")]
                {
                    if map_ready.get() {
                        view! {
                            <MapContainer
                                class="search-map-container"
                                center=Position::new(DEFAULT_CENTER.lat, DEFAULT_CENTER.lng)
                                zoom=DEFAULT_ZOOM
                                set_view=true
                                map=map.write_only()
                            >
                                <TileLayer url=TILE_URL attribution=TILE_ATTRIBUTION />
                            </MapContainer>
                        }
                        .into_any()
                    } else {
                        view! {
                            <LoadingView message=Some("Inicializando mapa...".to_string()) />
                        }
                        .into_any()
                    }
                }

                #[cfg(not(feature = "hydrate"))]
                {
                    let _ = map_ready.get();
                    view! {
                        <LoadingView message=Some("Inicializando mapa...".to_string()) />
                    }
                    .into_any()
                }
            }}
        </div>
    }
}

/// Builds the controller around the freshly mounted map, runs the bootstrap
/// sequence and starts draining page commands.
#[cfg(feature = "hydrate")]
fn start_controller(
    map: leptos_leaflet::leaflet::Map,
    panel: SignalPanel,
    commands: CommandChannel,
) {
    use std::rc::Rc;

    use futures::StreamExt;
    use leptos::task::spawn_local;

    use crate::api::ServerFnApi;
    use crate::config::SearchSettings;
    use crate::search::SearchController;
    use geolocation::BrowserGeolocator;
    use leaflet_surface::LeafletSurface;

    let CommandChannel {
        sender,
        mut receiver,
    } = commands;

    let surface = LeafletSurface::new(map, sender);
    let controller = Rc::new(SearchController::new(
        surface,
        ServerFnApi,
        panel,
        SearchSettings::default(),
    ));

    let bootstrap = Rc::clone(&controller);
    spawn_local(async move {
        bootstrap.bootstrap(&BrowserGeolocator).await;
    });

    spawn_local(async move {
        while let Some(command) = receiver.next().await {
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                controller.dispatch(command).await;
            });
        }
    });
}

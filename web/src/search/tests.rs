//! Controller tests against in-memory map, API, panel and geolocation fakes.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use futures::channel::oneshot;
use serde_json::json;
use shared_types::{circle_ring, Bounds, FeatureCollection, LngLat};

use super::*;
use crate::config::{FitBoundsOptions, GeolocationOptions};
use crate::error::{ApiError, GeolocationError};
use crate::search::layers::*;
use crate::search::panel::*;
use crate::search::surface::{Cursor, LayerSpec, PointerEventKind, SourceData};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeSurface {
    sources: HashMap<String, SourceData>,
    added_sources: Vec<&'static str>,
    layers: Vec<LayerSpec>,
    subscriptions: Vec<(&'static str, PointerEventKind)>,
    fits: Vec<(Bounds, FitBoundsOptions)>,
    flights: Vec<(LngLat, f64)>,
    center: LngLat,
    recenters: Vec<LngLat>,
    marker: Option<(LngLat, &'static str)>,
    cursor: Option<Cursor>,
    popup: Option<(LngLat, String)>,
    mutations: usize,
}

impl FakeSurface {
    fn centered_at(center: LngLat) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    fn layer_ids(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    fn source(&self, id: &str) -> Option<&SourceData> {
        self.sources.get(id)
    }
}

impl MapSurface for FakeSurface {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &'static str, data: SourceData) {
        assert!(!self.has_source(id), "source {id} added twice");
        self.mutations += 1;
        self.added_sources.push(id);
        self.sources.insert(id.to_string(), data);
    }

    fn set_source_data(&mut self, id: &str, data: SourceData) {
        assert!(self.has_source(id), "source {id} updated before creation");
        self.mutations += 1;
        self.sources.insert(id.to_string(), data);
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        assert!(self.has_source(layer.source), "layer {} has no source", layer.id);
        self.mutations += 1;
        self.layers.push(layer);
    }

    fn fit_bounds(&mut self, bounds: Bounds, options: FitBoundsOptions) {
        self.mutations += 1;
        self.fits.push((bounds, options));
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64, _speed: f64) {
        self.mutations += 1;
        self.center = center;
        self.flights.push((center, zoom));
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn set_center(&mut self, center: LngLat) {
        self.mutations += 1;
        self.center = center;
        self.recenters.push(center);
    }

    fn place_user_marker(&mut self, at: LngLat, color: &'static str) {
        self.mutations += 1;
        self.marker = Some((at, color));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn show_popup(&mut self, at: LngLat, text: &str) {
        self.popup = Some((at, text.to_string()));
    }

    fn hide_popup(&mut self) {
        self.popup = None;
    }

    fn subscribe(&mut self, layer_id: &'static str, kind: PointerEventKind) {
        self.subscriptions.push((layer_id, kind));
    }
}

type Reply = Result<FeatureCollection, ApiError>;

enum Queued {
    Ready(Reply),
    Pending(oneshot::Receiver<Reply>),
}

#[derive(Default)]
struct FakeApi {
    nearby: RefCell<VecDeque<Queued>>,
    catalog: RefCell<Option<Reply>>,
    nearby_calls: RefCell<Vec<(String, f64)>>,
    catalog_calls: RefCell<usize>,
}

impl FakeApi {
    fn replying(reply: Reply) -> Self {
        let api = Self::default();
        api.nearby.borrow_mut().push_back(Queued::Ready(reply));
        api
    }

    fn with_catalog(self, reply: Reply) -> Self {
        *self.catalog.borrow_mut() = Some(reply);
        self
    }
}

impl EntityApi for FakeApi {
    async fn fetch_nearby(&self, entity: &str, range_meters: f64) -> Reply {
        self.nearby_calls
            .borrow_mut()
            .push((entity.to_string(), range_meters));
        let queued = self.nearby.borrow_mut().pop_front();
        match queued {
            Some(Queued::Ready(reply)) => reply,
            Some(Queued::Pending(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Transport("reply dropped".to_string()))),
            None => Err(ApiError::Transport("no reply queued".to_string())),
        }
    }

    async fn fetch_all(&self) -> Reply {
        *self.catalog_calls.borrow_mut() += 1;
        self.catalog
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(ApiError::Transport("no catalog queued".to_string())))
    }
}

#[derive(Default)]
struct FakePanel {
    form: RefCell<SearchForm>,
    statuses: RefCell<Vec<Status>>,
    count: RefCell<Option<usize>>,
    results: RefCell<Option<ResultList>>,
    clears: RefCell<usize>,
}

impl FakePanel {
    fn with_form(entity: &str, range: &str) -> Self {
        let panel = Self::default();
        *panel.form.borrow_mut() = SearchForm {
            entity: entity.to_string(),
            range: range.to_string(),
        };
        panel
    }

    fn status(&self) -> Option<Status> {
        self.statuses.borrow().last().cloned()
    }

    fn count(&self) -> Option<usize> {
        *self.count.borrow()
    }

    fn lines(&self) -> Vec<String> {
        self.results
            .borrow()
            .as_ref()
            .map(ResultList::lines)
            .unwrap_or_default()
    }
}

impl SearchPanel for FakePanel {
    fn read_form(&self) -> SearchForm {
        self.form.borrow().clone()
    }

    fn set_entity_input(&self, entity: &str) {
        self.form.borrow_mut().entity = entity.to_string();
    }

    fn set_status(&self, status: Status) {
        self.statuses.borrow_mut().push(status);
    }

    fn set_count(&self, count: usize) {
        *self.count.borrow_mut() = Some(count);
    }

    fn clear_results(&self) {
        *self.clears.borrow_mut() += 1;
        *self.results.borrow_mut() = None;
    }

    fn show_results(&self, results: ResultList) {
        *self.results.borrow_mut() = Some(results);
    }
}

struct FakeGeolocator {
    supported: bool,
    position: Result<LngLat, GeolocationError>,
    requests: RefCell<Vec<GeolocationOptions>>,
}

impl FakeGeolocator {
    fn at(position: LngLat) -> Self {
        Self {
            supported: true,
            position: Ok(position),
            requests: RefCell::default(),
        }
    }

    fn failing(err: GeolocationError) -> Self {
        Self {
            supported: true,
            position: Err(err),
            requests: RefCell::default(),
        }
    }

    fn unsupported() -> Self {
        Self {
            supported: false,
            position: Err(GeolocationError::PositionUnavailable),
            requests: RefCell::default(),
        }
    }
}

impl Geolocator for FakeGeolocator {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> Result<LngLat, GeolocationError> {
        self.requests.borrow_mut().push(options);
        self.position.clone()
    }
}

type Controller = SearchController<FakeSurface, FakeApi, FakePanel>;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const COPACABANA: LngLat = LngLat {
    lng: -43.1822,
    lat: -22.9711,
};

fn point(name: &str, lng: f64, lat: f64, is_base: bool) -> serde_json::Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lng, lat] },
        "properties": { "name": name, "lat": lat, "lon": lng, "is_base": is_base }
    })
}

fn collection(features: Vec<serde_json::Value>) -> FeatureCollection {
    FeatureCollection::from_geojson_value(&json!({
        "type": "FeatureCollection",
        "features": features,
    }))
    .unwrap()
}

fn copacabana_result() -> FeatureCollection {
    collection(vec![
        point("Copacabana", COPACABANA.lng, COPACABANA.lat, true),
        point("Leme", -43.1676, -22.9634, false),
        point("Arpoador", -43.1910, -22.9880, false),
    ])
}

fn catalog() -> FeatureCollection {
    collection(vec![
        point("Arpoador", -43.1910, -22.9880, false),
        point("Copacabana", COPACABANA.lng, COPACABANA.lat, false),
        point("Leme", -43.1676, -22.9634, false),
        point("Urca", -43.1629, -22.9493, false),
    ])
}

fn controller(api: FakeApi, panel: FakePanel) -> Controller {
    SearchController::new(
        FakeSurface::centered_at(crate::config::DEFAULT_CENTER),
        api,
        panel,
        SearchSettings::default(),
    )
}

async fn ready_controller(api: FakeApi, panel: FakePanel) -> Controller {
    let controller = controller(api.with_catalog(Ok(catalog())), panel);
    controller.bootstrap(&FakeGeolocator::unsupported()).await;
    controller
}

fn settings() -> SearchSettings {
    SearchSettings::default()
}

fn within(bounds: &Bounds, point: LngLat) -> bool {
    (bounds.south_west.lng..=bounds.north_east.lng).contains(&point.lng)
        && (bounds.south_west.lat..=bounds.north_east.lat).contains(&point.lat)
}

// ---------------------------------------------------------------------------
// Map layer synchronizer
// ---------------------------------------------------------------------------

#[test]
fn test_first_nearby_update_creates_sources_and_layers() {
    let mut layers = MapLayers::new(FakeSurface::default());
    layers.update_nearby(&copacabana_result(), 500.0, &settings());

    let surface = layers.surface();
    assert_eq!(surface.added_sources, vec![NEARBY_SOURCE, CIRCLE_SOURCE]);
    assert_eq!(
        surface.layer_ids(),
        vec![NEARBY_LAYER, BASE_LAYER, CIRCLE_FILL_LAYER, CIRCLE_LINE_LAYER]
    );
    assert!(layers.interactions().is_registered(NEARBY_LAYER));
    assert!(layers.interactions().is_registered(BASE_LAYER));
    assert!(!layers.interactions().is_registered(CIRCLE_FILL_LAYER));
}

#[test]
fn test_point_layers_split_on_is_base() {
    let mut layers = MapLayers::new(FakeSurface::default());
    let data = copacabana_result();
    layers.update_nearby(&data, 500.0, &settings());

    let surface = layers.surface();
    let filter_of = |id: &str| {
        surface
            .layers
            .iter()
            .find(|layer| layer.id == id)
            .and_then(|layer| layer.filter)
            .unwrap()
    };

    let bases: Vec<_> = data
        .iter()
        .filter(|f| filter_of(BASE_LAYER).matches(f))
        .filter_map(|f| f.name())
        .collect();
    let neighbors: Vec<_> = data
        .iter()
        .filter(|f| filter_of(NEARBY_LAYER).matches(f))
        .filter_map(|f| f.name())
        .collect();

    assert_eq!(bases, vec!["Copacabana"]);
    assert_eq!(neighbors, vec!["Leme", "Arpoador"]);
}

#[test]
fn test_repeated_nearby_updates_replace_data_in_place() {
    let mut layers = MapLayers::new(FakeSurface::default());
    layers.update_nearby(&copacabana_result(), 500.0, &settings());

    let second = collection(vec![point("Urca", -43.1629, -22.9493, true)]);
    layers.update_nearby(&second, 300.0, &settings());
    layers.update_nearby(&second, 300.0, &settings());

    let surface = layers.surface();
    assert_eq!(surface.added_sources.len(), 2);
    assert_eq!(surface.layers.len(), 4);
    assert_eq!(surface.subscriptions.len(), 6);
    assert_eq!(layers.interactions().len(), 2);
    assert_eq!(
        surface.source(NEARBY_SOURCE),
        Some(&SourceData::Features(second))
    );
}

#[test]
fn test_circle_drawn_around_base_with_requested_radius() {
    let mut layers = MapLayers::new(FakeSurface::default());
    let update = layers.update_nearby(&copacabana_result(), 500.0, &settings());
    assert!(update.circle_drawn);

    let Some(SourceData::Polygon(ring)) = layers.surface().source(CIRCLE_SOURCE) else {
        panic!("circle source should hold a polygon");
    };
    assert_eq!(ring.len(), settings().circle_steps + 1);
    assert_eq!(ring, &circle_ring(COPACABANA, 500.0, settings().circle_steps));
}

#[test]
fn test_invalid_range_clears_circle() {
    for range in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        let mut layers = MapLayers::new(FakeSurface::default());
        layers.update_nearby(&copacabana_result(), 500.0, &settings());

        let update = layers.update_nearby(&copacabana_result(), range, &settings());
        assert!(!update.circle_drawn, "range {range} drew a circle");
        assert_eq!(
            layers.surface().source(CIRCLE_SOURCE),
            Some(&SourceData::Empty)
        );
    }
}

#[test]
fn test_missing_base_clears_circle() {
    let mut layers = MapLayers::new(FakeSurface::default());
    layers.update_nearby(&copacabana_result(), 500.0, &settings());

    let no_base = collection(vec![point("Leme", -43.1676, -22.9634, false)]);
    layers.update_nearby(&no_base, 500.0, &settings());
    assert_eq!(
        layers.surface().source(CIRCLE_SOURCE),
        Some(&SourceData::Empty)
    );

    let base_without_geometry = collection(vec![json!({
        "properties": { "name": "Copacabana", "is_base": true }
    })]);
    let update = layers.update_nearby(&base_without_geometry, 500.0, &settings());
    assert!(!update.circle_drawn);
}

#[test]
fn test_viewport_fits_all_points() {
    let mut layers = MapLayers::new(FakeSurface::default());
    let update = layers.update_nearby(&copacabana_result(), 500.0, &settings());

    let (bounds, options) = layers.surface().fits[0];
    assert_eq!(update.fitted_to, Some(bounds));
    assert_eq!(bounds.south_west, LngLat::new(-43.1910, -22.9880));
    assert_eq!(bounds.north_east, LngLat::new(-43.1676, -22.9634));
    assert_eq!(options, settings().fit_bounds);
    assert_eq!(options.padding, 80.0);
    assert_eq!(options.max_zoom, 14.0);
    assert_eq!(options.duration_ms, 800);
}

#[test]
fn test_no_points_means_no_viewport_change() {
    let mut layers = MapLayers::new(FakeSurface::default());
    let update = layers.update_nearby(&FeatureCollection::default(), 500.0, &settings());
    assert_eq!(update.fitted_to, None);

    let only_broken = collection(vec![json!({ "geometry": { "type": "Polygon" } })]);
    layers.update_nearby(&only_broken, 500.0, &settings());
    assert!(layers.surface().fits.is_empty());
}

#[test]
fn test_catalog_layer_created_once_without_circle_or_fit() {
    let mut layers = MapLayers::new(FakeSurface::default());
    layers.update_catalog(&catalog());
    layers.update_catalog(&FeatureCollection::default());

    let surface = layers.surface();
    assert_eq!(surface.added_sources, vec![CATALOG_SOURCE]);
    assert_eq!(surface.layer_ids(), vec![CATALOG_LAYER]);
    assert!(surface.fits.is_empty());
    assert!(!surface.has_source(CIRCLE_SOURCE));
    assert!(layers.interactions().is_registered(CATALOG_LAYER));
    assert_eq!(
        surface.source(CATALOG_SOURCE),
        Some(&SourceData::Features(FeatureCollection::default()))
    );
}

#[test]
fn test_interactions_registered_once_per_layer() {
    let mut surface = FakeSurface::default();
    let mut registry = crate::search::interactions::InteractionRegistry::default();

    assert!(registry.register(&mut surface, NEARBY_LAYER));
    assert!(!registry.register(&mut surface, NEARBY_LAYER));
    assert_eq!(
        surface.subscriptions,
        vec![
            (NEARBY_LAYER, PointerEventKind::Move),
            (NEARBY_LAYER, PointerEventKind::Leave),
            (NEARBY_LAYER, PointerEventKind::Click),
        ]
    );
}

// ---------------------------------------------------------------------------
// Search orchestrator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_copacabana_search_scenario() {
    let api = FakeApi::replying(Ok(copacabana_result()));
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "500")).await;

    controller.handle_submit().await;

    let panel = controller.panel();
    assert_eq!(panel.count(), Some(2));
    assert_eq!(
        panel.lines(),
        vec![
            "Leme • -22.96340, -43.16760".to_string(),
            "Arpoador • -22.98800, -43.19100".to_string(),
        ]
    );
    assert_eq!(panel.status(), Some(Status::success(MSG_SEARCH_DONE)));
    assert_eq!(
        *controller.api.nearby_calls.borrow(),
        vec![("Copacabana".to_string(), 500.0)]
    );

    let layers = controller.layers();
    let surface = layers.surface();
    assert!(matches!(
        surface.source(CIRCLE_SOURCE),
        Some(SourceData::Polygon(_))
    ));
    let (bounds, _) = surface.fits.last().copied().unwrap();
    assert!(copacabana_result()
        .iter()
        .filter_map(|f| f.geometry)
        .all(|p| within(&bounds, p)));
}

#[tokio::test]
async fn test_search_sets_searching_state_before_request() {
    let api = FakeApi::replying(Ok(copacabana_result()));
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "500")).await;
    let before = controller.panel().statuses.borrow().len();

    controller.handle_submit().await;

    let statuses = controller.panel().statuses.borrow();
    assert_eq!(statuses[before], Status::info(MSG_SEARCHING));
    assert_eq!(*controller.panel().clears.borrow(), 1);
}

#[tokio::test]
async fn test_base_and_three_neighbors_lists_three() {
    let data = collection(vec![
        point("A", 1.0, 1.0, false),
        point("Base", 0.0, 0.0, true),
        point("B", 2.0, 2.0, false),
        point("C", 3.0, 3.0, false),
    ]);
    let controller = ready_controller(
        FakeApi::replying(Ok(data)),
        FakePanel::with_form("Base", "1000"),
    )
    .await;

    controller.handle_submit().await;

    assert_eq!(controller.panel().count(), Some(3));
    assert_eq!(
        controller.panel().lines(),
        vec![
            "A • 1.00000, 1.00000".to_string(),
            "B • 2.00000, 2.00000".to_string(),
            "C • 3.00000, 3.00000".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_only_base_shows_placeholder() {
    let data = collection(vec![point("Base", 0.0, 0.0, true)]);
    let controller =
        ready_controller(FakeApi::replying(Ok(data)), FakePanel::with_form("Base", "10")).await;

    controller.handle_submit().await;

    assert_eq!(controller.panel().count(), Some(0));
    assert_eq!(controller.panel().lines(), vec![MSG_NO_RESULTS.to_string()]);
}

#[tokio::test]
async fn test_empty_entity_never_reaches_network() {
    let controller = ready_controller(FakeApi::default(), FakePanel::with_form("", "10")).await;

    controller.handle_submit().await;

    assert!(controller.api.nearby_calls.borrow().is_empty());
    assert_eq!(controller.panel().count(), Some(0));
    assert_eq!(controller.panel().status(), Some(Status::error(MSG_INVALID_FORM)));
}

#[tokio::test]
async fn test_unparseable_range_never_reaches_network() {
    let controller =
        ready_controller(FakeApi::default(), FakePanel::with_form("Leme", "longe")).await;

    controller.handle_submit().await;

    assert!(controller.api.nearby_calls.borrow().is_empty());
    assert_eq!(controller.panel().count(), Some(0));
}

#[tokio::test]
async fn test_http_500_reports_status_without_touching_map() {
    let api = FakeApi::replying(Err(ApiError::Status(500)));
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "500")).await;
    let mutations_before = controller.layers().surface().mutations;

    controller.handle_submit().await;

    assert_eq!(
        controller.panel().status(),
        Some(Status::error("Erro na API (500)"))
    );
    assert_eq!(controller.panel().count(), Some(0));
    assert_eq!(controller.layers().surface().mutations, mutations_before);
    assert!(!controller.layers().surface().has_source(NEARBY_SOURCE));
}

#[tokio::test]
async fn test_proxied_error_message_is_shown_verbatim() {
    let api = FakeApi::replying(Err(ApiError::Server("Erro na API (422)".to_string())));
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "")).await;

    controller.handle_submit().await;

    assert_eq!(
        *controller.api.nearby_calls.borrow(),
        vec![("Copacabana".to_string(), 0.0)]
    );
    assert_eq!(
        controller.panel().status(),
        Some(Status::error("Erro na API (422)"))
    );
}

#[tokio::test]
async fn test_submit_before_bootstrap_is_ignored() {
    let controller = controller(
        FakeApi::replying(Ok(copacabana_result())),
        FakePanel::with_form("Copacabana", "500"),
    );

    controller.handle_submit().await;

    assert!(controller.api.nearby_calls.borrow().is_empty());
    assert!(controller.panel().statuses.borrow().is_empty());
}

fn racing_api() -> (FakeApi, oneshot::Sender<Reply>, oneshot::Sender<Reply>) {
    let (older_tx, older_rx) = oneshot::channel();
    let (newer_tx, newer_rx) = oneshot::channel();
    let api = FakeApi::default();
    api.nearby.borrow_mut().push_back(Queued::Pending(older_rx));
    api.nearby.borrow_mut().push_back(Queued::Pending(newer_rx));
    (api, older_tx, newer_tx)
}

fn older_result() -> FeatureCollection {
    collection(vec![
        point("Velho", 0.0, 0.0, true),
        point("Antigo", 1.0, 1.0, false),
    ])
}

#[tokio::test]
async fn test_stale_response_is_dropped() {
    let (api, older_tx, newer_tx) = racing_api();
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "500")).await;

    let older = controller.handle_submit();
    let newer = controller.handle_submit();
    let network = async {
        newer_tx.send(Ok(copacabana_result())).unwrap();
        tokio::task::yield_now().await;
        older_tx.send(Ok(older_result())).unwrap();
    };
    futures::join!(older, newer, network);

    assert_eq!(controller.panel().count(), Some(2));
    assert_eq!(controller.panel().lines()[0], "Leme • -22.96340, -43.16760");
    assert_eq!(
        controller.layers().surface().source(NEARBY_SOURCE),
        Some(&SourceData::Features(copacabana_result()))
    );
}

#[tokio::test]
async fn test_last_resolver_wins_when_sequencing_disabled() {
    let (api, older_tx, newer_tx) = racing_api();
    let controller = SearchController::new(
        FakeSurface::default(),
        api.with_catalog(Ok(catalog())),
        FakePanel::with_form("Copacabana", "500"),
        SearchSettings {
            drop_stale_responses: false,
            ..SearchSettings::default()
        },
    );
    controller.bootstrap(&FakeGeolocator::unsupported()).await;

    let older = controller.handle_submit();
    let newer = controller.handle_submit();
    let network = async {
        newer_tx.send(Ok(copacabana_result())).unwrap();
        tokio::task::yield_now().await;
        older_tx.send(Ok(older_result())).unwrap();
    };
    futures::join!(older, newer, network);

    assert_eq!(controller.panel().count(), Some(1));
    assert_eq!(
        controller.panel().lines(),
        vec!["Antigo • 1.00000, 1.00000".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Hover / click
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_hover_shows_named_popup_and_leave_hides_it() {
    let controller = ready_controller(FakeApi::default(), FakePanel::default()).await;
    let leme = catalog().features[2].clone();
    let at = LngLat::new(-43.1676, -22.9634);

    controller
        .handle_map_event(MapEvent::PointerMove {
            layer: CATALOG_LAYER.to_string(),
            at,
            feature: Some(leme),
        })
        .await;
    {
        let layers = controller.layers();
        assert_eq!(layers.surface().cursor, Some(Cursor::Pointer));
        assert_eq!(layers.surface().popup, Some((at, "Leme".to_string())));
    }

    controller
        .handle_map_event(MapEvent::PointerLeave {
            layer: CATALOG_LAYER.to_string(),
        })
        .await;
    let layers = controller.layers();
    assert_eq!(layers.surface().cursor, Some(Cursor::Default));
    assert_eq!(layers.surface().popup, None);
}

#[tokio::test]
async fn test_hover_over_unnamed_feature_uses_placeholder() {
    let controller = ready_controller(FakeApi::default(), FakePanel::default()).await;
    let unnamed = collection(vec![json!({
        "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
        "properties": {}
    })])
    .features[0]
        .clone();

    controller
        .handle_map_event(MapEvent::PointerMove {
            layer: CATALOG_LAYER.to_string(),
            at: LngLat::default(),
            feature: Some(unnamed),
        })
        .await;

    let popup = controller.layers().surface().popup.clone();
    assert_eq!(popup.map(|(_, text)| text), Some(UNNAMED.to_string()));
}

#[tokio::test]
async fn test_events_from_unregistered_layers_are_ignored() {
    let controller = ready_controller(FakeApi::default(), FakePanel::default()).await;

    controller
        .handle_map_event(MapEvent::PointerMove {
            layer: CIRCLE_FILL_LAYER.to_string(),
            at: LngLat::default(),
            feature: Some(catalog().features[0].clone()),
        })
        .await;

    assert_eq!(controller.layers().surface().popup, None);
}

#[tokio::test]
async fn test_click_fills_form_and_resubmits() {
    let api = FakeApi::replying(Ok(copacabana_result()));
    let controller = ready_controller(api, FakePanel::with_form("", "500")).await;
    let copacabana = catalog().features[1].clone();

    controller
        .handle_map_event(MapEvent::Click {
            layer: CATALOG_LAYER.to_string(),
            feature: Some(copacabana),
        })
        .await;

    let panel = controller.panel();
    assert_eq!(panel.form.borrow().entity, "Copacabana");
    assert!(panel
        .statuses
        .borrow()
        .contains(&Status::info("Centralizando em Copacabana...")));
    assert_eq!(
        *controller.api.nearby_calls.borrow(),
        vec![("Copacabana".to_string(), 500.0)]
    );
    assert_eq!(panel.count(), Some(2));
}

#[tokio::test]
async fn test_click_resets_hover_once_results_render() {
    let api = FakeApi::replying(Ok(copacabana_result()));
    let controller = ready_controller(api, FakePanel::with_form("", "500")).await;
    let copacabana = catalog().features[1].clone();

    controller
        .handle_map_event(MapEvent::PointerMove {
            layer: CATALOG_LAYER.to_string(),
            at: COPACABANA,
            feature: Some(copacabana.clone()),
        })
        .await;
    assert_eq!(controller.layers().surface().cursor, Some(Cursor::Pointer));

    controller
        .handle_map_event(MapEvent::Click {
            layer: CATALOG_LAYER.to_string(),
            feature: Some(copacabana),
        })
        .await;

    let layers = controller.layers();
    assert_eq!(layers.surface().cursor, Some(Cursor::Default));
    assert_eq!(layers.surface().popup, None);
}

#[test]
fn test_replacing_catalog_resets_hover() {
    let mut layers = MapLayers::new(FakeSurface::default());
    layers.update_catalog(&catalog());
    layers.surface_mut().set_cursor(Cursor::Pointer);
    layers.surface_mut().show_popup(COPACABANA, "Copacabana");

    layers.update_catalog(&catalog());

    assert_eq!(layers.surface().cursor, Some(Cursor::Default));
    assert_eq!(layers.surface().popup, None);
}

#[tokio::test]
async fn test_click_on_unnamed_feature_does_nothing() {
    let controller = ready_controller(FakeApi::default(), FakePanel::with_form("Leme", "500")).await;
    let statuses_before = controller.panel().statuses.borrow().len();

    controller
        .handle_map_event(MapEvent::Click {
            layer: CATALOG_LAYER.to_string(),
            feature: Some(Default::default()),
        })
        .await;
    controller
        .handle_map_event(MapEvent::Click {
            layer: CATALOG_LAYER.to_string(),
            feature: None,
        })
        .await;

    assert!(controller.api.nearby_calls.borrow().is_empty());
    assert_eq!(controller.panel().statuses.borrow().len(), statuses_before);
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_bootstrap_locates_user_and_loads_catalog() {
    let controller = controller(
        FakeApi::default().with_catalog(Ok(catalog())),
        FakePanel::default(),
    );
    let user = LngLat::new(-43.18, -22.95);
    let geolocator = FakeGeolocator::at(user);

    controller.bootstrap(&geolocator).await;

    assert!(controller.is_ready());
    assert_eq!(
        *geolocator.requests.borrow(),
        vec![GeolocationOptions {
            high_accuracy: true,
            timeout_ms: 8_000,
            maximum_age_ms: 60_000,
        }]
    );
    {
        let layers = controller.layers();
        let surface = layers.surface();
        assert_eq!(surface.flights, vec![(user, 13.0)]);
        assert_eq!(surface.marker, Some((user, "#2f6f5e")));
        assert_eq!(surface.layer_ids(), vec![CATALOG_LAYER]);
    }

    let panel = controller.panel();
    let statuses = panel.statuses.borrow();
    assert!(statuses.contains(&Status::success(MSG_LOCATION_FOUND)));
    assert!(statuses.contains(&Status::success(MSG_CATALOG_LOADED)));
    assert_eq!(panel.count(), Some(4));
    assert_eq!(panel.lines().len(), 4);
}

#[tokio::test]
async fn test_geolocation_failure_recenters_on_load_center() {
    let controller = controller(
        FakeApi::default().with_catalog(Ok(catalog())),
        FakePanel::default(),
    );

    controller
        .bootstrap(&FakeGeolocator::failing(GeolocationError::PermissionDenied))
        .await;

    let layers = controller.layers();
    assert_eq!(
        layers.surface().recenters,
        vec![crate::config::DEFAULT_CENTER]
    );
    assert!(layers.surface().marker.is_none());
    assert!(controller
        .panel()
        .statuses
        .borrow()
        .contains(&Status::error(MSG_LOCATION_FAILED)));
}

#[tokio::test]
async fn test_unsupported_geolocation_reports_status() {
    let controller = controller(
        FakeApi::default().with_catalog(Ok(catalog())),
        FakePanel::default(),
    );

    controller.bootstrap(&FakeGeolocator::unsupported()).await;

    assert!(controller
        .panel()
        .statuses
        .borrow()
        .contains(&Status::info(MSG_LOCATION_UNSUPPORTED)));
    assert!(controller.layers().surface().flights.is_empty());
}

#[tokio::test]
async fn test_catalog_failure_reports_error() {
    let controller = controller(
        FakeApi::default().with_catalog(Err(ApiError::Status(502))),
        FakePanel::default(),
    );

    controller.bootstrap(&FakeGeolocator::unsupported()).await;

    assert_eq!(
        controller.panel().status(),
        Some(Status::error("Erro na API (502)"))
    );
    assert!(controller.layers().surface().layers.is_empty());
    // Submitting still works after a failed catalog load.
    assert!(controller.is_ready());
}

#[tokio::test]
async fn test_bootstrap_runs_once() {
    let controller = controller(
        FakeApi::default().with_catalog(Ok(catalog())),
        FakePanel::default(),
    );

    controller.bootstrap(&FakeGeolocator::unsupported()).await;
    controller.bootstrap(&FakeGeolocator::unsupported()).await;

    assert_eq!(*controller.api.catalog_calls.borrow(), 1);
    assert_eq!(controller.layers().surface().added_sources, vec![CATALOG_SOURCE]);
}

#[tokio::test]
async fn test_dispatch_routes_commands() {
    let api = FakeApi::replying(Ok(copacabana_result()));
    let controller = ready_controller(api, FakePanel::with_form("Copacabana", "500")).await;

    controller.dispatch(Command::Submit).await;
    controller
        .dispatch(Command::Map(MapEvent::PointerLeave {
            layer: NEARBY_LAYER.to_string(),
        }))
        .await;

    assert_eq!(controller.panel().count(), Some(2));
    assert_eq!(controller.layers().surface().cursor, Some(Cursor::Default));
}

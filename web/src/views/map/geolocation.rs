use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use shared_types::LngLat;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{
    Geolocation, Position as GeolocationPosition, PositionError as GeolocationPositionError,
    PositionOptions,
};

use crate::config::GeolocationOptions;
use crate::error::GeolocationError;
use crate::search::Geolocator;

/// `navigator.geolocation`
pub struct BrowserGeolocator;

fn browser_geolocation() -> Option<Geolocation> {
    let navigator = web_sys::window()?.navigator();
    let present = js_sys::Reflect::has(&navigator, &JsValue::from_str("geolocation")).ok()?;
    if !present {
        return None;
    }
    navigator.geolocation().ok()
}

impl Geolocator for BrowserGeolocator {
    fn is_supported(&self) -> bool {
        browser_geolocation().is_some()
    }

    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> Result<LngLat, GeolocationError> {
        let geolocation = browser_geolocation()
            .ok_or_else(|| GeolocationError::Other("geolocation unavailable".to_string()))?;

        let (tx, rx) = oneshot::channel::<Result<LngLat, GeolocationError>>();
        // Either callback may fire, whichever comes first takes the sender
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let tx = Rc::clone(&tx);
            Closure::once(move |position: GeolocationPosition| {
                let coords = position.coords();
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Ok(LngLat::new(coords.longitude(), coords.latitude())));
                }
            })
        };
        let on_error = {
            let tx = Rc::clone(&tx);
            Closure::once(move |error: GeolocationPositionError| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err(GeolocationError::from_code(
                        error.code(),
                        error.message(),
                    )));
                }
            })
        };

        let position_options = PositionOptions::new();
        position_options.set_enable_high_accuracy(options.high_accuracy);
        position_options.set_timeout(options.timeout_ms);
        position_options.set_maximum_age(options.maximum_age_ms);

        geolocation
            .get_current_position_with_error_callback_and_options(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &position_options,
            )
            .map_err(|err| GeolocationError::Other(format!("{:?}", err)))?;

        let result = rx
            .await
            .unwrap_or_else(|_| Err(GeolocationError::Other("request abandoned".to_string())));

        // Both closures must outlive the browser callback
        drop(on_success);
        drop(on_error);
        result
    }
}

//! Owns the lookup state behind the single weather screen.
//!
//! Every submit is tagged with a ticket. Only the most recently issued ticket
//! may change the state, so a slow response that lands after a newer submit
//! is dropped instead of overwriting it.

use crate::{
    error::LookupError,
    location::{LocationSource, Permission},
    model::{Coordinates, Query, WeatherResult},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded(WeatherResult),
    Failed(LookupError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match self {
            RequestState::Succeeded(weather) => Some(weather),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Identifies one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be completed for the lookup to leave Loading"]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Controller<P, L> {
    provider: P,
    location: L,
    state: RequestState,
    issued: u64,
}

impl<P: WeatherProvider, L: LocationSource> Controller<P, L> {
    pub fn new(provider: P, location: L) -> Self {
        Self { provider, location, state: RequestState::Idle, issued: 0 }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Start a new request, discarding whatever was shown before.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state = RequestState::Loading;
        Ticket(self.issued)
    }

    /// Apply an outcome. Returns `false` if a newer request has been issued
    /// since `ticket`, in which case the state is left alone.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<WeatherResult, LookupError>,
    ) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(stale = ticket.0, latest = self.issued, "dropping stale response");
            return false;
        }

        self.state = match outcome {
            Ok(weather) => RequestState::Succeeded(weather),
            Err(err) => RequestState::Failed(err),
        };
        true
    }

    /// "Get Weather" with the typed city name. Blank input does nothing.
    pub async fn submit_city(&mut self, input: &str) -> &RequestState {
        let Ok(query) = Query::city(input) else {
            tracing::debug!("ignoring blank city input");
            return &self.state;
        };
        self.submit(query).await
    }

    pub async fn submit_coordinates(&mut self, coords: Coordinates) -> &RequestState {
        self.submit(Query::Coordinates(coords)).await
    }

    /// "Use Current Location": consent, one reading, then a coordinate lookup.
    pub async fn submit_current_location(&mut self) -> &RequestState {
        let ticket = self.begin();

        let outcome = match self.location.request_permission().await {
            Permission::Denied => Err(LookupError::PermissionDenied),
            Permission::Granted => match self.location.current_position().await {
                Ok(coords) => self
                    .provider
                    .fetch(&Query::Coordinates(coords))
                    .await
                    .map_err(LookupError::from),
                Err(err) => Err(err.into()),
            },
        };

        self.complete(ticket, outcome);
        &self.state
    }

    async fn submit(&mut self, query: Query) -> &RequestState {
        let ticket = self.begin();
        let outcome = self.provider.fetch(&query).await.map_err(LookupError::from);
        self.complete(ticket, outcome);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, LocationError};
    use async_trait::async_trait;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    fn sample(name: &str) -> WeatherResult {
        WeatherResult {
            location_name: name.to_string(),
            temperature_c: 21.5,
            feels_like_c: 20.9,
            humidity_pct: 60,
            pressure_hpa: 1013,
            wind_speed_mps: 3.1,
            clouds_pct: 0,
            visibility_m: 10000,
            description: "clear sky".to_string(),
            observed_at: None,
        }
    }

    #[derive(Debug, Default)]
    struct FakeProvider {
        outcomes: Mutex<Vec<Result<WeatherResult, FetchError>>>,
        queries: Mutex<Vec<Query>>,
    }

    impl FakeProvider {
        fn returning(outcomes: Vec<Result<WeatherResult, FetchError>>) -> Self {
            let mut outcomes = outcomes;
            outcomes.reverse();
            Self { outcomes: Mutex::new(outcomes), queries: Mutex::default() }
        }

        fn queries(&self) -> Vec<Query> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch(&self, query: &Query) -> Result<WeatherResult, FetchError> {
            self.queries.lock().unwrap().push(query.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(FetchError::Network("no outcome queued".into())))
        }
    }

    #[derive(Debug)]
    struct FakeLocation {
        permission: Permission,
        position: Result<Coordinates, LocationError>,
        readings: AtomicUsize,
    }

    impl FakeLocation {
        fn new(permission: Permission, position: Result<Coordinates, LocationError>) -> Self {
            Self { permission, position, readings: AtomicUsize::new(0) }
        }

        fn granted() -> Self {
            Self::new(Permission::Granted, Ok(Coordinates { latitude: 48.85, longitude: 2.35 }))
        }
    }

    #[async_trait]
    impl LocationSource for FakeLocation {
        async fn request_permission(&self) -> Permission {
            self.permission
        }

        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            self.readings.fetch_add(1, Ordering::SeqCst);
            self.position.clone()
        }
    }

    #[test]
    fn starts_idle() {
        let c = Controller::new(FakeProvider::default(), FakeLocation::granted());
        assert_eq!(c.state(), &RequestState::Idle);
    }

    #[tokio::test]
    async fn city_lookup_succeeds() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![Ok(sample("Paris"))]),
            FakeLocation::granted(),
        );

        let state = c.submit_city(" Paris ").await;

        assert_eq!(state.result(), Some(&sample("Paris")));
        assert_eq!(c.provider().queries(), vec![Query::City("Paris".into())]);
    }

    #[tokio::test]
    async fn blank_city_is_a_no_op() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![Ok(sample("Paris"))]),
            FakeLocation::granted(),
        );
        c.submit_city("Paris").await;

        let state = c.submit_city("   ").await.clone();

        assert_eq!(state.result(), Some(&sample("Paris")));
        assert_eq!(c.provider().queries().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_clears_previous_result() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![
                Ok(sample("Paris")),
                Err(FetchError::Network("connection reset".into())),
            ]),
            FakeLocation::granted(),
        );

        c.submit_city("Paris").await;
        let state = c.submit_city("Paris").await;

        assert_eq!(
            state,
            &RequestState::Failed(LookupError::Fetch(FetchError::Network(
                "connection reset".into()
            )))
        );
        assert!(state.result().is_none());
    }

    #[tokio::test]
    async fn not_found_never_populates_result() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![Err(FetchError::NotFound {
                code: "404".into(),
                message: "city not found".into(),
            })]),
            FakeLocation::granted(),
        );

        let state = c.submit_city("Atlantis").await;

        assert!(state.result().is_none());
        assert!(matches!(
            state.error(),
            Some(LookupError::Fetch(FetchError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn new_submit_after_failure_recovers() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![
                Err(FetchError::Decode("truncated".into())),
                Ok(sample("Oslo")),
            ]),
            FakeLocation::granted(),
        );

        assert!(c.submit_city("Oslo").await.error().is_some());
        assert_eq!(c.submit_city("Oslo").await.result(), Some(&sample("Oslo")));
    }

    #[tokio::test]
    async fn denied_permission_skips_reading_and_network() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![Ok(sample("Paris"))]),
            FakeLocation::new(Permission::Denied, Ok(Coordinates { latitude: 0.0, longitude: 0.0 })),
        );

        let state = c.submit_current_location().await;

        assert_eq!(state, &RequestState::Failed(LookupError::PermissionDenied));
        assert!(c.provider().queries().is_empty());
        assert_eq!(c.location().readings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn current_location_fetches_by_coordinates() {
        let mut c = Controller::new(
            FakeProvider::returning(vec![Ok(sample("Paris"))]),
            FakeLocation::granted(),
        );

        let state = c.submit_current_location().await;

        assert_eq!(state.result(), Some(&sample("Paris")));
        assert_eq!(
            c.provider().queries(),
            vec![Query::Coordinates(Coordinates { latitude: 48.85, longitude: 2.35 })]
        );
    }

    #[tokio::test]
    async fn failed_position_reading_skips_network() {
        let mut c = Controller::new(
            FakeProvider::default(),
            FakeLocation::new(Permission::Granted, Err(LocationError::Unavailable("no fix".into()))),
        );

        let state = c.submit_current_location().await;

        assert_eq!(state, &RequestState::Failed(LookupError::LocationUnavailable("no fix".into())));
        assert!(c.provider().queries().is_empty());
    }

    #[tokio::test]
    async fn submit_coordinates_uses_given_point() {
        let here = Coordinates::new(-33.87, 151.21).unwrap();
        let mut c = Controller::new(
            FakeProvider::returning(vec![Ok(sample("Sydney"))]),
            FakeLocation::granted(),
        );

        c.submit_coordinates(here).await;

        assert_eq!(c.provider().queries(), vec![Query::Coordinates(here)]);
        assert_eq!(c.location().readings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn begin_enters_loading_and_discards_result() {
        let mut c = Controller::new(FakeProvider::default(), FakeLocation::granted());
        let first = c.begin();
        assert!(c.complete(first, Ok(sample("Paris"))));

        let _second = c.begin();

        assert!(c.state().is_loading());
        assert!(c.state().result().is_none());
    }

    #[test]
    fn late_response_from_older_request_is_dropped() {
        let mut c = Controller::new(FakeProvider::default(), FakeLocation::granted());

        let older = c.begin();
        let newer = c.begin();

        assert!(c.complete(newer, Ok(sample("Berlin"))));
        assert!(!c.complete(older, Ok(sample("Paris"))));

        assert_eq!(c.state().result(), Some(&sample("Berlin")));
    }

    #[test]
    fn stale_failure_keeps_loading() {
        let mut c = Controller::new(FakeProvider::default(), FakeLocation::granted());

        let older = c.begin();
        let newer = c.begin();

        assert!(!c.complete(older, Err(LookupError::PermissionDenied)));
        assert!(c.state().is_loading());

        assert!(c.complete(newer, Ok(sample("Rome"))));
        assert_eq!(c.state().result(), Some(&sample("Rome")));
    }
}

use validator::Validate;

use crate::dto::location::{CreateLocationRequest, UpdateLocationRequest};
use crate::error::Result;
use crate::models::{Location, NewLocation};
use crate::repository::LocationStore;
use crate::services::geocoding::{Geocoder, geocode_location};

/// Validate, geocode and store a new location.
///
/// The location is stored even when the address cannot be geocoded or the
/// geocoding service fails.
pub async fn create_location<S, G>(
    store: &S,
    geocoder: &G,
    request: &CreateLocationRequest,
) -> Result<Location>
where
    S: LocationStore + ?Sized,
    G: Geocoder + ?Sized,
{
    request.validate()?;

    let mut location = NewLocation::from(request);
    geocode_location(geocoder, &mut location).await;

    store.insert(&location).await
}

/// Apply `request` to an existing location and store it. A location that is
/// still missing coordinates gets another geocoding attempt; existing
/// coordinates are kept as they are.
pub async fn update_location<S, G>(
    store: &S,
    geocoder: &G,
    id: i32,
    request: &UpdateLocationRequest,
) -> Result<Location>
where
    S: LocationStore + ?Sized,
    G: Geocoder + ?Sized,
{
    request.validate()?;

    let existing = store.find(id).await?;
    let mut location = request.apply_to(&existing);
    geocode_location(geocoder, &mut location).await;

    store.update(&location).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::models::{Coordinates, Geocodable};
    use crate::services::geocoding::GeocodeError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Location>>,
    }

    fn timestamp() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[async_trait::async_trait]
    impl LocationStore for MemoryStore {
        async fn find(&self, id: i32) -> Result<Location> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.location_id == id)
                .cloned()
                .ok_or(StorageError::NotFound)
        }

        async fn insert(&self, location: &NewLocation) -> Result<Location> {
            let mut rows = self.rows.lock().unwrap();
            let row = Location {
                location_id: rows.len() as i32 + 1,
                city: location.city.clone(),
                state: location.state.clone(),
                zip_code: location.zip_code,
                address: location.address.clone(),
                description: location.description.clone(),
                latitude: location.latitude,
                longitude: location.longitude,
                created_at: timestamp(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn update(&self, location: &Location) -> Result<Location> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|l| l.location_id == location.location_id)
                .ok_or(StorageError::NotFound)?;
            *row = location.clone();
            Ok(row.clone())
        }
    }

    enum Reply {
        Found(Coordinates),
        NoMatch,
        Timeout,
        Forbidden,
        Broken,
    }

    struct CountingGeocoder {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl CountingGeocoder {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Geocoder for CountingGeocoder {
        async fn lookup(&self, _query: &str) -> std::result::Result<Option<Coordinates>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Found(c) => Ok(Some(c)),
                Reply::NoMatch => Ok(None),
                Reply::Timeout => Err(GeocodeError::Timeout),
                Reply::Forbidden => Err(GeocodeError::Client(
                    "service responded with 403 Forbidden".to_string(),
                )),
                Reply::Broken => Err(GeocodeError::InvalidResponse("not json".to_string())),
            }
        }
    }

    const DURHAM: Coordinates = Coordinates {
        latitude: 35.994,
        longitude: -78.8986,
    };

    fn bad_address() -> CreateLocationRequest {
        CreateLocationRequest {
            city: "Nowhere".to_string(),
            state: "NC".to_string(),
            zip_code: 45321,
            address: "111 Main Street".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_geocodes_new_location() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::Found(DURHAM));

        let location = create_location(&store, &geocoder, &bad_address())
            .await
            .unwrap();

        assert_eq!(location.coordinates(), Some(DURHAM));
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_create_without_match_still_saves() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::NoMatch);

        let location = create_location(&store, &geocoder, &bad_address())
            .await
            .unwrap();

        assert_eq!(location.latitude, None);
        assert_eq!(location.longitude, None);
        assert!(!location.has_coordinates());
        assert_eq!(store.find(location.location_id).await.unwrap().address, "111 Main Street");
    }

    #[tokio::test]
    async fn test_create_survives_service_timeout() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::Timeout);

        let location = create_location(&store, &geocoder, &bad_address())
            .await
            .unwrap();

        assert!(!location.has_coordinates());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_survives_rejected_lookup() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::Forbidden);

        let location = create_location(&store, &geocoder, &bad_address())
            .await
            .unwrap();

        assert!(!location.has_coordinates());
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_survives_unreadable_response() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::Broken);

        let location = create_location(&store, &geocoder, &bad_address())
            .await
            .unwrap();

        assert!(!location.has_coordinates());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::Found(DURHAM));
        let mut req = bad_address();
        req.zip_code = 1_000_000;

        let result = create_location(&store, &geocoder, &req).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_resave_with_coordinates_never_geocodes() {
        let store = MemoryStore::default();
        let first = CountingGeocoder::new(Reply::Found(DURHAM));
        let created = create_location(&store, &first, &bad_address())
            .await
            .unwrap();

        let geocoder = CountingGeocoder::new(Reply::Found(Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        }));
        let update = UpdateLocationRequest {
            address: Some("200 Other Road".to_string()),
            ..Default::default()
        };
        let updated = update_location(&store, &geocoder, created.location_id, &update)
            .await
            .unwrap();

        assert_eq!(geocoder.calls(), 0);
        assert_eq!(updated.coordinates(), Some(DURHAM));
        assert_eq!(updated.address, "200 Other Road");
    }

    #[tokio::test]
    async fn test_resave_retries_missing_coordinates() {
        let store = MemoryStore::default();
        let offline = CountingGeocoder::new(Reply::Timeout);
        let created = create_location(&store, &offline, &bad_address())
            .await
            .unwrap();
        assert!(!created.has_coordinates());

        let online = CountingGeocoder::new(Reply::Found(DURHAM));
        let updated = update_location(
            &store,
            &online,
            created.location_id,
            &UpdateLocationRequest::default(),
        )
        .await
        .unwrap();

        assert_eq!(online.calls(), 1);
        assert_eq!(updated.coordinates(), Some(DURHAM));
    }

    #[tokio::test]
    async fn test_update_unknown_location() {
        let store = MemoryStore::default();
        let geocoder = CountingGeocoder::new(Reply::NoMatch);

        let result =
            update_location(&store, &geocoder, 42, &UpdateLocationRequest::default()).await;

        assert!(matches!(result, Err(StorageError::NotFound)));
    }
}

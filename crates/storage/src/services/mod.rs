pub mod geocoding;
pub mod locations;
pub mod news;
pub mod organizers;
pub mod race_windows;
pub mod races;
pub mod schedule;
pub mod seasons;

/// A pool that never connects. Services that reject a request before any
/// query can be tested against it without a database.
#[cfg(test)]
pub(crate) fn offline_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://racemanager@localhost/racemanager_test")
        .unwrap()
}

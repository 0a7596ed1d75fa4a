pub mod location;
pub mod organizer;
pub mod race;
pub mod season;
pub mod story;

pub use location::{LocationRepository, LocationStore};
pub use organizer::OrganizerRepository;
pub use race::RaceRepository;
pub use season::SeasonRepository;
pub use story::StoryRepository;

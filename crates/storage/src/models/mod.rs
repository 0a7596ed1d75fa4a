pub mod location;
pub mod organizer;
pub mod race;
pub mod results;
pub mod season;
pub mod story;

pub use location::{Coordinates, Geocodable, Location, NewLocation};
pub use organizer::Organizer;
pub use race::{Race, Scheduled};
pub use results::{HasResults, ResultsRef};
pub use season::Season;
pub use story::{Story, StoryStatus, month_from_abbreviation};

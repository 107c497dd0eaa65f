mod event;
mod film;
mod review;
mod user;

pub use event::{Event, EventType, NewEvent, Operation};
pub use film::{
    genre_catalog, min_release_date, Director, Film, Genre, Mpa, MpaRating, NewFilm,
    MAX_DESCRIPTION_LEN, MAX_DIRECTOR_NAME_LEN, MIN_RELEASE_YEAR,
};
pub use review::{vote_weight, NewReview, Review, ReviewVote};
pub use user::{FriendEdge, NewUser, User};

use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_DIRECTOR_NAME_LEN: usize = 200;
pub const MIN_RELEASE_YEAR: i32 = 1895;

/// Earliest accepted release date (the first public film screening)
pub fn min_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(MIN_RELEASE_YEAR, 12, 28).unwrap_or(NaiveDate::MIN)
}

/// Film genre from the fixed lookup table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// The fixed genre lookup table
pub fn genre_catalog() -> Vec<Genre> {
    [
        (1, "Comedy"),
        (2, "Drama"),
        (3, "Animation"),
        (4, "Thriller"),
        (5, "Documentary"),
        (6, "Action"),
    ]
    .into_iter()
    .map(|(id, name)| Genre {
        id,
        name: name.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Director {
    pub id: i64,
    pub name: String,
}

impl Director {
    /// Validates a director name
    pub fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Director name must be provided".to_string(),
            ));
        }
        if name.chars().count() > MAX_DIRECTOR_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Director name exceeds {} characters",
                MAX_DIRECTOR_NAME_LEN
            )));
        }
        Ok(())
    }
}

/// MPA rating classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Mpa", try_from = "Mpa")]
pub enum MpaRating {
    G,
    Pg,
    Pg13,
    R,
    Nc17,
}

/// Wire shape of an MPA rating: `{"id": 3, "name": "PG-13"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mpa {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

impl MpaRating {
    pub const ALL: [MpaRating; 5] = [
        MpaRating::G,
        MpaRating::Pg,
        MpaRating::Pg13,
        MpaRating::R,
        MpaRating::Nc17,
    ];

    pub fn id(&self) -> i32 {
        match self {
            MpaRating::G => 1,
            MpaRating::Pg => 2,
            MpaRating::Pg13 => 3,
            MpaRating::R => 4,
            MpaRating::Nc17 => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MpaRating::G => "G",
            MpaRating::Pg => "PG",
            MpaRating::Pg13 => "PG-13",
            MpaRating::R => "R",
            MpaRating::Nc17 => "NC-17",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|rating| rating.id() == id)
    }
}

impl Display for MpaRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<MpaRating> for Mpa {
    fn from(rating: MpaRating) -> Self {
        Mpa {
            id: rating.id(),
            name: rating.name().to_string(),
        }
    }
}

impl TryFrom<Mpa> for MpaRating {
    type Error = String;

    fn try_from(mpa: Mpa) -> Result<Self, Self::Error> {
        MpaRating::from_id(mpa.id).ok_or_else(|| format!("Unknown MPA rating id {}", mpa.id))
    }
}

/// A catalogued film with its genres and directors populated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: MpaRating,
    /// Sorted by genre id
    pub genres: Vec<Genre>,
    /// Sorted by director id
    pub directors: Vec<Director>,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn has_genre(&self, genre_id: i32) -> bool {
        self.genres.iter().any(|genre| genre.id == genre_id)
    }
}

/// Validated film fields, ready to be persisted
///
/// Genre and director references are plain ids; the catalogue service checks
/// that they exist before handing the value to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFilm {
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: MpaRating,
    pub genre_ids: BTreeSet<i32>,
    pub director_ids: BTreeSet<i64>,
}

impl NewFilm {
    pub fn new(
        name: String,
        description: Option<String>,
        release_date: NaiveDate,
        duration: i32,
        mpa: MpaRating,
        genre_ids: impl IntoIterator<Item = i32>,
        director_ids: impl IntoIterator<Item = i64>,
    ) -> AppResult<Self> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Film name cannot be empty".to_string(),
            ));
        }

        let description = description.unwrap_or_default();
        let description_len = description.chars().count();
        if description_len > MAX_DESCRIPTION_LEN {
            return Err(AppError::InvalidInput(format!(
                "Description has {} characters, maximum is {}",
                description_len, MAX_DESCRIPTION_LEN
            )));
        }

        if release_date < min_release_date() {
            return Err(AppError::InvalidInput(format!(
                "Release date cannot be earlier than {}",
                min_release_date()
            )));
        }

        if duration < 0 {
            return Err(AppError::InvalidInput(
                "Film duration cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            name,
            description,
            release_date,
            duration,
            mpa,
            genre_ids: genre_ids.into_iter().collect(),
            director_ids: director_ids.into_iter().collect(),
        })
    }

    /// Materializes the film once the store has resolved its references
    pub fn into_film(self, id: i64, genres: Vec<Genre>, directors: Vec<Director>) -> Film {
        Film {
            id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: self.mpa,
            genres,
            directors,
        }
    }
}

//! Entity CRUD for users, films, directors and the fixed lookup tables

use std::sync::Arc;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Director, Film, Genre, MpaRating, NewFilm, NewUser, User},
};

use super::{require_film, require_user};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // ---------------------------------------------------------------- users

    #[tracing::instrument(skip(self, user), fields(login = %user.login))]
    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.ensure_unique(&user, None).await?;
        let user = self.store.create_user(user).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(login = %user.login))]
    pub async fn update_user(&self, id: i64, user: NewUser) -> AppResult<User> {
        require_user(self.store.as_ref(), id).await?;
        self.ensure_unique(&user, Some(id)).await?;

        self.store
            .update_user(id, user)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        require_user(self.store.as_ref(), id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.all_users().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        if !self.store.delete_user(id).await? {
            return Err(AppError::not_found("User", id));
        }
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    async fn ensure_unique(&self, user: &NewUser, except: Option<i64>) -> AppResult<()> {
        if let Some(existing) = self.store.find_user_by_email(&user.email).await? {
            if Some(existing.id) != except {
                return Err(AppError::Conflict(format!(
                    "Email {} is already in use",
                    user.email
                )));
            }
        }
        if let Some(existing) = self.store.find_user_by_login(&user.login).await? {
            if Some(existing.id) != except {
                return Err(AppError::Conflict(format!(
                    "Login {} is already in use",
                    user.login
                )));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------- films

    #[tracing::instrument(skip(self, film), fields(name = %film.name))]
    pub async fn create_film(&self, film: NewFilm) -> AppResult<Film> {
        self.ensure_references(&film).await?;
        let film = self.store.create_film(film).await?;
        tracing::info!(film_id = film.id, "Film created");
        Ok(film)
    }

    #[tracing::instrument(skip(self, film), fields(name = %film.name))]
    pub async fn update_film(&self, id: i64, film: NewFilm) -> AppResult<Film> {
        require_film(self.store.as_ref(), id).await?;
        self.ensure_references(&film).await?;

        self.store
            .update_film(id, film)
            .await?
            .ok_or_else(|| AppError::not_found("Film", id))
    }

    pub async fn get_film(&self, id: i64) -> AppResult<Film> {
        require_film(self.store.as_ref(), id).await
    }

    pub async fn list_films(&self) -> AppResult<Vec<Film>> {
        self.store.all_films().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_film(&self, id: i64) -> AppResult<()> {
        if !self.store.delete_film(id).await? {
            return Err(AppError::not_found("Film", id));
        }
        tracing::info!(film_id = id, "Film deleted");
        Ok(())
    }

    async fn ensure_references(&self, film: &NewFilm) -> AppResult<()> {
        for genre_id in &film.genre_ids {
            self.get_genre(*genre_id).await?;
        }
        for director_id in &film.director_ids {
            self.get_director(*director_id).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------ directors

    pub async fn create_director(&self, name: String) -> AppResult<Director> {
        Director::validate_name(&name)?;
        let director = self.store.create_director(name).await?;
        tracing::info!(director_id = director.id, "Director created");
        Ok(director)
    }

    pub async fn update_director(&self, director: Director) -> AppResult<Director> {
        Director::validate_name(&director.name)?;
        let id = director.id;
        self.store
            .update_director(director)
            .await?
            .ok_or_else(|| AppError::not_found("Director", id))
    }

    pub async fn get_director(&self, id: i64) -> AppResult<Director> {
        self.store
            .get_director(id)
            .await?
            .ok_or_else(|| AppError::not_found("Director", id))
    }

    pub async fn list_directors(&self) -> AppResult<Vec<Director>> {
        self.store.all_directors().await
    }

    pub async fn delete_director(&self, id: i64) -> AppResult<()> {
        if !self.store.delete_director(id).await? {
            return Err(AppError::not_found("Director", id));
        }
        tracing::info!(director_id = id, "Director deleted");
        Ok(())
    }

    // -------------------------------------------------------------- lookups

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.store
            .get_genre(id)
            .await?
            .ok_or_else(|| AppError::not_found("Genre", id))
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.all_genres().await
    }

    pub fn get_mpa(&self, id: i32) -> AppResult<MpaRating> {
        MpaRating::from_id(id).ok_or_else(|| AppError::not_found("MPA rating", id))
    }

    pub fn list_mpa(&self) -> Vec<MpaRating> {
        MpaRating::ALL.to_vec()
    }
}

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

/// Validated user fields, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}

impl NewUser {
    /// Validates raw user fields
    ///
    /// A blank or missing name falls back to the login.
    pub fn new(
        email: String,
        login: String,
        name: Option<String>,
        birthday: Option<NaiveDate>,
    ) -> AppResult<Self> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(AppError::InvalidInput("Email must be provided".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidInput(format!("Malformed email: {}", email)));
        }

        if login.trim().is_empty() || login.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidInput(
                "Login must be non-empty and contain no whitespace".to_string(),
            ));
        }

        if let Some(date) = birthday {
            let today = Utc::now().date_naive();
            if date > today {
                return Err(AppError::InvalidInput(format!(
                    "Birthday cannot be later than {}",
                    today
                )));
            }
        }

        let name = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => login.clone(),
        };

        Ok(Self {
            email,
            login,
            name,
            birthday,
        })
    }

    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
        }
    }
}

/// Directed friendship edge; `confirmed` is set once the reverse edge exists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendEdge {
    pub user_id: i64,
    pub friend_id: i64,
    pub confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid(name: Option<&str>) -> AppResult<NewUser> {
        NewUser::new(
            "ann@example.com".to_string(),
            "ann".to_string(),
            name.map(str::to_string),
            NaiveDate::from_ymd_opt(1990, 5, 17),
        )
    }

    #[test]
    fn test_blank_name_defaults_to_login() {
        assert_eq!(valid(None).unwrap().name, "ann");
        assert_eq!(valid(Some("  ")).unwrap().name, "ann");
        assert_eq!(valid(Some("Ann Lee")).unwrap().name, "Ann Lee");
    }

    #[test]
    fn test_rejects_email_without_at() {
        let result = NewUser::new("ann.example.com".into(), "ann".into(), None, None);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_login_with_spaces() {
        let result = NewUser::new("ann@example.com".into(), "ann lee".into(), None, None);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_future_birthday() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let result = NewUser::new("ann@example.com".into(), "ann".into(), None, Some(tomorrow));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_into_user_keeps_fields() {
        let user = valid(Some("Ann")).unwrap().into_user(7);
        assert_eq!(user.id, 7);
        assert_eq!(user.login, "ann");
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1990, 5, 17));
    }
}

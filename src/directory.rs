//! User directory: fetches the static users resource on every request and
//! renders one card per user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::User;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("could not parse users payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No users found in data.json")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct UsersPayload {
    #[serde(default)]
    users: Option<Vec<User>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCard {
    pub badge: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub zipcode: String,
    pub company: String,
}

impl From<&User> for UserCard {
    fn from(user: &User) -> Self {
        Self {
            badge: format!("#{}", user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: format!("{}, {}", user.address.street, user.address.city),
            zipcode: user.address.zipcode.clone(),
            company: user.company.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub cards: Vec<UserCard>,
    pub stats: String,
    pub notice: String,
}

#[derive(Debug, Clone)]
enum Source {
    Remote(String),
    File(String),
}

#[derive(Debug, Clone)]
pub struct Directory {
    source: Source,
    client: reqwest::Client,
}

impl Directory {
    /// `http(s)://` locations are fetched over HTTP, anything else is read as a file.
    pub fn new(location: &str) -> Self {
        let source = if location.starts_with("http://") || location.starts_with("https://") {
            Source::Remote(location.to_string())
        } else {
            Source::File(location.to_string())
        };

        Self {
            source,
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self) -> Result<String, DirectoryError> {
        match &self.source {
            Source::Remote(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(DirectoryError::Status(response.status().as_u16()));
                }
                Ok(response.text().await?)
            }
            Source::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| DirectoryError::Read {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }

    pub async fn load(&self) -> Result<Vec<User>, DirectoryError> {
        let body = self.fetch().await?;
        parse_users(&body)
    }

    pub async fn listing(&self) -> Result<Listing, DirectoryError> {
        let users = self.load().await.map_err(|e| {
            warn!("Failed to load users: {e}");
            e
        })?;

        info!("Loaded {} users", users.len());
        Ok(render(&users))
    }
}

pub fn parse_users(body: &str) -> Result<Vec<User>, DirectoryError> {
    let payload: UsersPayload = serde_json::from_str(body)?;
    match payload.users {
        Some(users) if !users.is_empty() => Ok(users),
        _ => Err(DirectoryError::Empty),
    }
}

pub fn render(users: &[User]) -> Listing {
    Listing {
        cards: users.iter().map(UserCard::from).collect(),
        stats: format!("Displaying {} users", users.len()),
        notice: format!("Successfully loaded {} users from data.json", users.len()),
    }
}

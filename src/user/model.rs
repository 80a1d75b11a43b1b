use async_graphql::{InputObject, SimpleObject};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::error::ApiError;

pub const DEFAULT_STATUS: &str = "I am new!";

/// User document as stored in the `users` collection. `password` holds the
/// bcrypt hash and must never cross the API surface.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password: String,
    pub name: String,
    pub status: String,
    pub posts: Vec<ObjectId>,
}

impl User {
    pub fn new(email: String, hashed_password: String, name: String) -> Self {
        User {
            id: None,
            email,
            password: hashed_password,
            name,
            status: DEFAULT_STATUS.to_string(),
            posts: Vec::new(),
        }
    }
}

#[derive(Debug, InputObject)]
pub struct UserInputData {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// User as exposed through the API surface: identity normalized to its hex
/// string form, owned posts as reference ids, no password hash.
#[derive(Debug, Clone, SimpleObject)]
pub struct UserData {
    #[graphql(name = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub posts: Vec<String>,
}

impl UserData {
    pub fn from_user(user: User) -> Result<Self, ApiError> {
        let id = user
            .id
            .ok_or_else(|| ApiError::Internal("User ID missing".to_string()))?;
        Ok(UserData {
            id: id.to_hex(),
            email: user.email,
            name: user.name,
            status: user.status,
            posts: user.posts.iter().map(|p| p.to_hex()).collect(),
        })
    }
}

/// Login result: the signed bearer token and the user identity string.
#[derive(Debug, SimpleObject)]
pub struct AuthData {
    pub token: String,
    pub user_id: String,
}

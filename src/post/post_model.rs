use async_graphql::{InputObject, SimpleObject};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::user::model::{User, UserData};
use crate::utils::error::ApiError;

/// Post document as stored in the `posts` collection. Timestamps are BSON
/// datetimes so the store can sort feeds by creation time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Post {
    pub fn new(title: String, content: String, image_url: String, creator: ObjectId) -> Self {
        let now = DateTime::now();
        Post {
            id: ObjectId::new(),
            title,
            content,
            image_url,
            creator,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct PostInputData {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

/// Post as exposed through the API surface: owner populated inline,
/// timestamps rendered as ISO-8601 strings.
#[derive(Debug, SimpleObject)]
pub struct PostData {
    #[graphql(name = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: UserData,
    pub created_at: String,
    pub updated_at: String,
}

impl PostData {
    pub fn from_post(post: Post, creator: User) -> Result<Self, ApiError> {
        Ok(PostData {
            id: post.id.to_hex(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator: UserData::from_user(creator)?,
            created_at: to_iso_string(post.created_at)?,
            updated_at: to_iso_string(post.updated_at)?,
        })
    }
}

pub fn to_iso_string(ts: DateTime) -> Result<String, ApiError> {
    ts.try_to_rfc3339_string()
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// One page of the feed plus the total number of posts.
#[derive(Debug, SimpleObject)]
pub struct PostsData {
    pub posts: Vec<PostData>,
    pub total_posts: u64,
}

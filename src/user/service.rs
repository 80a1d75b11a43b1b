use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::database::db::DATABASE_NAME;
use crate::user::model::User;
use crate::utils::error::ApiError;

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DATABASE_NAME).collection::<User>("users");
        UserService { collection }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub async fn insert(&self, user: &User) -> Result<ObjectId, ApiError> {
        let result = self
            .collection
            .insert_one(user)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Failed to get inserted ID".to_string()))
    }

    pub async fn set_status(&self, id: &ObjectId, status: &str) -> Result<(), ApiError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": status } })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Append a post reference to the user's owned-post collection.
    pub async fn push_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), ApiError> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$push": { "posts": post_id } },
            )
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Remove a post reference from the user's owned-post collection.
    pub async fn pull_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), ApiError> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "posts": post_id } },
            )
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(())
    }
}

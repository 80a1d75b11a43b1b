use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::database::db::DATABASE_NAME;
use crate::post::post_model::Post;
use crate::utils::error::ApiError;

pub struct PostService {
    collection: Collection<Post>,
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DATABASE_NAME).collection::<Post>("posts");
        PostService { collection }
    }

    pub async fn insert(&self, post: &Post) -> Result<(), ApiError> {
        self.collection
            .insert_one(post)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, ApiError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub async fn count(&self) -> Result<u64, ApiError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// One feed page, most recent first.
    pub async fn find_page(&self, skip: u64, limit: i64) -> Result<Vec<Post>, ApiError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Overwrite title and content, and the image reference when one is
    /// supplied. Returns the updated document.
    pub async fn update(
        &self,
        id: &ObjectId,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Option<Post>, ApiError> {
        let mut set = doc! {
            "title": title,
            "content": content,
            "updated_at": DateTime::now(),
        };
        if let Some(image_url) = image_url {
            set.insert("image_url", image_url);
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}

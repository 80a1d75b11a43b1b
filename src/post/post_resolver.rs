use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult};
use mongodb::bson::oid::ObjectId;

use crate::graphql::index::require_auth;
use crate::post::post_model::{Post, PostData, PostInputData, PostsData};
use crate::post::post_service::PostService;
use crate::user::service::UserService;
use crate::utils::error::ApiError;
use crate::utils::file::clear_image;
use crate::utils::validation::validate_post_input;

pub const POSTS_PER_PAGE: i64 = 2;

/// Placeholder the client sends when no image was picked; a post carrying it
/// keeps it until a real image arrives.
const NO_IMAGE: &str = "undefined";

fn page_skip(page: i64) -> u64 {
    let page = page.max(1);
    ((page - 1) * POSTS_PER_PAGE) as u64
}

fn parse_post_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("No post found!".to_string()))
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// One feed page, most recent first, with each post's owner populated.
    async fn posts(&self, ctx: &Context<'_>, page: Option<i64>) -> GraphQLResult<PostsData> {
        require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;
        let users = ctx.data::<UserService>()?;

        let page = page.unwrap_or(1);
        let total_posts = posts.count().await.map_err(|e| e.extend())?;
        let page_posts = posts
            .find_page(page_skip(page), POSTS_PER_PAGE)
            .await
            .map_err(|e| e.extend())?;

        let mut out = Vec::with_capacity(page_posts.len());
        for post in page_posts {
            let creator = users
                .find_by_id(&post.creator)
                .await
                .map_err(|e| e.extend())?
                .ok_or_else(|| ApiError::Internal("Creator not found".to_string()).extend())?;
            out.push(PostData::from_post(post, creator).map_err(|e| e.extend())?);
        }

        Ok(PostsData {
            posts: out,
            total_posts,
        })
    }

    async fn post(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<PostData> {
        require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;
        let users = ctx.data::<UserService>()?;

        let post = posts
            .find_by_id(&parse_post_id(&id).map_err(|e| e.extend())?)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("No post found!".to_string()).extend())?;

        let creator = users
            .find_by_id(&post.creator)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::Internal("Creator not found".to_string()).extend())?;

        PostData::from_post(post, creator).map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        post_input: PostInputData,
    ) -> GraphQLResult<PostData> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;
        let users = ctx.data::<UserService>()?;

        let errors = validate_post_input(&post_input.title, &post_input.content);
        if !errors.is_empty() {
            return Err(ApiError::invalid_input(errors).extend());
        }

        let user = users
            .find_by_id(&user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()).extend())?;

        let post = Post::new(
            post_input.title,
            post_input.content,
            post_input.image_url,
            user_id,
        );
        posts.insert(&post).await.map_err(|e| e.extend())?;
        users
            .push_post(&user_id, &post.id)
            .await
            .map_err(|e| e.extend())?;

        let mut creator = user;
        creator.posts.push(post.id);

        PostData::from_post(post, creator).map_err(|e| e.extend())
    }

    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: String,
        post_input: PostInputData,
    ) -> GraphQLResult<PostData> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;
        let users = ctx.data::<UserService>()?;

        let post_id = parse_post_id(&id).map_err(|e| e.extend())?;
        let post = posts
            .find_by_id(&post_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("No post found!".to_string()).extend())?;

        // Ownership is checked against the populated creator record.
        let creator = users
            .find_by_id(&post.creator)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::Internal("Creator not found".to_string()).extend())?;
        if creator.id != Some(user_id) {
            return Err(
                ApiError::Forbidden("Not authorized to edit the post!".to_string()).extend(),
            );
        }

        let errors = validate_post_input(&post_input.title, &post_input.content);
        if !errors.is_empty() {
            return Err(ApiError::invalid_input(errors).extend());
        }

        // The image reference is only replaced once the post carries a real
        // one; the placeholder marker stays until an upload succeeds.
        let image_url = (post.image_url != NO_IMAGE).then_some(post_input.image_url.as_str());

        let updated = posts
            .update(&post_id, &post_input.title, &post_input.content, image_url)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("No post found!".to_string()).extend())?;

        PostData::from_post(updated, creator).map_err(|e| e.extend())
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let posts = ctx.data::<PostService>()?;
        let users = ctx.data::<UserService>()?;

        let post_id = parse_post_id(&id).map_err(|e| e.extend())?;
        let post = posts
            .find_by_id(&post_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("No post found!".to_string()).extend())?;

        // Ownership is checked against the raw creator reference here; the
        // hex form matches what the populated check compares elsewhere.
        if post.creator.to_hex() != user_id.to_hex() {
            return Err(
                ApiError::Forbidden("Not authorized to delete the post!".to_string()).extend(),
            );
        }

        clear_image(&post.image_url).await;

        posts.delete(&post_id).await.map_err(|e| e.extend())?;
        users
            .pull_post(&user_id, &post_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_pagination_skips_whole_pages() {
        assert_eq!(page_skip(1), 0);
        assert_eq!(page_skip(2), 2);
        assert_eq!(page_skip(3), 4);
        // An unset page defaults to 1 upstream; a nonsense page clamps to it.
        assert_eq!(page_skip(0), 0);
        assert_eq!(page_skip(-7), 0);
    }

    #[test]
    fn page_two_of_five_covers_third_and_fourth() {
        let skip = page_skip(2) as usize;
        let limit = POSTS_PER_PAGE as usize;
        let ranks: Vec<usize> = (1..=5).skip(skip).take(limit).collect();
        assert_eq!(ranks, vec![3, 4]);
    }

    #[test]
    fn raw_and_populated_owner_references_agree() {
        // deletePost compares the raw reference, updatePost the populated id;
        // both reduce to the same hex serialization.
        let creator = ObjectId::new();
        let raw = creator.to_hex();
        let populated = ObjectId::parse_str(&raw).unwrap();
        assert_eq!(populated, creator);
        assert_eq!(populated.to_hex(), raw);
    }

    #[test]
    fn bad_post_id_reads_as_absent() {
        let err = parse_post_id("definitely-not-an-object-id").unwrap_err();
        assert_eq!(err.status(), 404);
    }
}

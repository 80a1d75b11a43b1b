use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptySubscription, MergedObject, Schema};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use mongodb::bson::oid::ObjectId;

use crate::middleware::auth::AuthContext;
use crate::post::post_resolver::{PostMutation, PostQuery};
use crate::post::post_service::PostService;
use crate::user::resolver::{UserMutation, UserQuery};
use crate::user::service::UserService;
use crate::utils::error::ApiError;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQuery, PostQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(UserMutation, PostMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the store handles injected as context data; the
/// resolver layer holds no state of its own.
pub fn build_schema(user_service: UserService, post_service: PostService) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(user_service)
    .data(post_service)
    .finish()
}

/// The authenticated caller's id, or an `Unauthorized` failure for anonymous
/// requests. Resolvers call this before any other check.
pub fn require_auth(ctx: &Context<'_>) -> Result<ObjectId, ApiError> {
    let auth = ctx
        .data::<AuthContext>()
        .map_err(|_| ApiError::Internal("Auth context not available".to_string()))?;
    let user_id = auth.require_user_id()?;
    ObjectId::parse_str(user_id)
        .map_err(|_| ApiError::Unauthorized("Invalid user id in token".to_string()))
}

pub async fn graphql_handler(
    schema: web::Data<AppSchema>,
    req: HttpRequest,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_else(AuthContext::anonymous);

    schema.execute(gql_request.into_inner().data(auth)).await.into()
}

pub async fn graphiql_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn graphql_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/graphql", web::post().to(graphql_handler))
        .route("/graphiql", web::get().to(graphiql_handler));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Request;
    use mongodb::Client;

    // The driver connects lazily, so schema tests never touch a live server
    // as long as the resolver fails before its first store access.
    async fn test_schema() -> AppSchema {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        build_schema(UserService::new(&client), PostService::new(&client))
    }

    #[actix_web::test]
    async fn sdl_exposes_every_operation() {
        let sdl = test_schema().await.sdl();
        for op in [
            "login",
            "user",
            "posts",
            "post",
            "createUser",
            "createPost",
            "updatePost",
            "deletePost",
            "updateStatus",
        ] {
            assert!(sdl.contains(op), "SDL is missing {op}");
        }
    }

    #[actix_web::test]
    async fn anonymous_user_query_is_unauthorized() {
        let schema = test_schema().await;
        let response = schema
            .execute(Request::new("{ user { _id } }").data(AuthContext::anonymous()))
            .await;

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["errors"][0]["message"], "Not authenticated!");
        assert_eq!(body["errors"][0]["extensions"]["status"], 401);
    }

    #[actix_web::test]
    async fn create_user_validation_accumulates_before_any_store_access() {
        let schema = test_schema().await;
        let query = r#"mutation {
            createUser(userInput: { email: "bogus", name: "Reader", password: "abc" }) { _id }
        }"#;
        let response = schema
            .execute(Request::new(query).data(AuthContext::anonymous()))
            .await;

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["errors"][0]["message"], "Invalid input values");
        assert_eq!(body["errors"][0]["extensions"]["status"], 422);
        assert_eq!(body["errors"][0]["extensions"]["data"][0], "Email is invalid");
        assert_eq!(
            body["errors"][0]["extensions"]["data"][1],
            "Password must be at least 5 characters"
        );
    }

    #[actix_web::test]
    async fn create_post_rejects_short_title_before_any_store_access() {
        let schema = test_schema().await;
        let auth = AuthContext::authenticated(
            "64f000000000000000000001".to_string(),
            "reader@example.com".to_string(),
        );
        let query = r#"mutation {
            createPost(postInput: { title: "short", content: "long enough content", imageUrl: "images/a.png" }) { _id }
        }"#;
        let response = schema.execute(Request::new(query).data(auth)).await;

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["errors"][0]["extensions"]["status"], 422);
        assert_eq!(
            body["errors"][0]["extensions"]["data"][0],
            "Title must be at least 6 characters in length"
        );
    }

    #[actix_web::test]
    async fn anonymous_mutations_short_circuit_before_validation() {
        let schema = test_schema().await;
        let query = r#"mutation {
            createPost(postInput: { title: "x", content: "y", imageUrl: "z" }) { _id }
        }"#;
        let response = schema
            .execute(Request::new(query).data(AuthContext::anonymous()))
            .await;

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["errors"][0]["extensions"]["status"], 401);
    }
}

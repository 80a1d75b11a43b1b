use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult};
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::graphql::index::require_auth;
use crate::middleware::auth::issue_token;
use crate::user::model::{AuthData, User, UserData, UserInputData};
use crate::user::service::UserService;
use crate::utils::error::ApiError;
use crate::utils::validation::validate_user_input;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// Look up by email and compare the supplied password against the stored
    /// hash. Issues a one-hour bearer token on success.
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> GraphQLResult<AuthData> {
        let users = ctx.data::<UserService>()?;

        let user = users
            .find_by_email(&email)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()).extend())?;

        let is_equal = verify(&password, &user.password)
            .map_err(|e| ApiError::Internal(e.to_string()).extend())?;
        if !is_equal {
            return Err(ApiError::Unauthorized("Invalid email or password".to_string()).extend());
        }

        let user_id = user
            .id
            .ok_or_else(|| ApiError::Internal("User ID missing".to_string()).extend())?
            .to_hex();
        let token = issue_token(&user_id, &user.email).map_err(|e| e.extend())?;

        Ok(AuthData { token, user_id })
    }

    /// The authenticated user's own record.
    async fn user(&self, ctx: &Context<'_>) -> GraphQLResult<UserData> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let users = ctx.data::<UserService>()?;

        let user = users
            .find_by_id(&user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()).extend())?;

        UserData::from_user(user).map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        user_input: UserInputData,
    ) -> GraphQLResult<UserData> {
        let users = ctx.data::<UserService>()?;

        let errors = validate_user_input(&user_input.email, &user_input.password);
        if !errors.is_empty() {
            return Err(ApiError::invalid_input(errors).extend());
        }

        if users
            .find_by_email(&user_input.email)
            .await
            .map_err(|e| e.extend())?
            .is_some()
        {
            return Err(ApiError::Conflict("User already exists".to_string()).extend());
        }

        let hashed_password = hash(&user_input.password, DEFAULT_COST)
            .map_err(|e| ApiError::Internal(e.to_string()).extend())?;

        let user = User::new(user_input.email, hashed_password, user_input.name);
        let inserted_id = users.insert(&user).await.map_err(|e| e.extend())?;

        UserData::from_user(User {
            id: Some(inserted_id),
            ..user
        })
        .map_err(|e| e.extend())
    }

    async fn update_status(&self, ctx: &Context<'_>, status: String) -> GraphQLResult<UserData> {
        let user_id = require_auth(ctx).map_err(|e| e.extend())?;
        let users = ctx.data::<UserService>()?;

        let mut user = users
            .find_by_id(&user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()).extend())?;

        users
            .set_status(&user_id, &status)
            .await
            .map_err(|e| e.extend())?;
        user.status = status;

        UserData::from_user(user).map_err(|e| e.extend())
    }
}

#[cfg(test)]
mod tests {
    use bcrypt::{DEFAULT_COST, hash, verify};

    #[test]
    fn stored_hash_never_equals_plaintext() {
        let plaintext = "hunter22";
        let hashed = hash(plaintext, DEFAULT_COST).unwrap();
        assert_ne!(hashed, plaintext);
        assert!(verify(plaintext, &hashed).unwrap());
        assert!(!verify("wrong-password", &hashed).unwrap());
    }
}

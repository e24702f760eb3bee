//! Role-based access control extractors.
//!
//! [`RequireStaff`] wraps [`AuthUser`] and rejects callers whose role does
//! not permit triggering generation. The role is read from the `users` table
//! on every request rather than trusted from token claims, so unknown,
//! deactivated, or demoted accounts fail closed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use studia_core::error::CoreError;
use studia_core::roles;
use studia_core::types::DbId;
use studia_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller whose database role is `admin` or `instructor`.
///
/// ```ignore
/// async fn staff_only(StaffUser { user_id, role }: StaffUser) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: DbId,
    pub role: String,
}

/// Requires the `admin` or `instructor` role. Rejects with 403 otherwise.
pub struct RequireStaff(pub StaffUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let role = UserRepo::find_active_role(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| {
                // Unknown or deactivated account: fail closed.
                AppError::Core(CoreError::Forbidden("Account is not active".into()))
            })?;

        if !roles::is_staff(&role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or Instructor role required".into(),
            )));
        }

        Ok(RequireStaff(StaffUser {
            user_id: user.user_id,
            role,
        }))
    }
}

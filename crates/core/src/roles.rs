//! Well-known role name constants.
//!
//! These must match the seed data in the users migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// Roles permitted to trigger image generation.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_INSTRUCTOR
}

use uuid::Uuid;

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The ID of the user the token was issued to.
    pub user_id: Uuid,
    /// The user's current email.
    pub email: String,
}

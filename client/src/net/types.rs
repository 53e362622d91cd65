//! Wire types shared by the typed API calls.

use uuid::Uuid;

/// Public user projection as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Body of `POST /api/register`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Successful register/login responses wrap the user.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

/// Responses whose payload is a human-readable confirmation.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct MessageBody {
    pub message: String,
}

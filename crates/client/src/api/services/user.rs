//! User management endpoints under `/users`.

use minisource_shared::{ApiError, CreateUserDto, PaginationParams, UpdateUserDto, User};
use serde::de::IgnoredAny;

use crate::api::{ApiClient, ServicePath};

const USERS: ServicePath = ServicePath::new("/users");

#[derive(Debug, Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Profile of the signed-in user
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.client.get(&USERS.join("/profile")).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<User, ApiError> {
        self.client.get(&USERS.segment(id)).await
    }

    /// List users (admin only)
    pub async fn get_all(&self, params: &PaginationParams) -> Result<Vec<User>, ApiError> {
        self.client.get_with_params(&USERS.root(), params).await
    }

    pub async fn create(&self, data: &CreateUserDto) -> Result<User, ApiError> {
        self.client.post(&USERS.root(), data).await
    }

    pub async fn update(&self, id: &str, data: &UpdateUserDto) -> Result<User, ApiError> {
        self.client.patch(&USERS.segment(id), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete::<IgnoredAny>(&USERS.segment(id))
            .await
            .map(|_| ())
    }
}

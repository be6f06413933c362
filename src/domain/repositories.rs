//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;

/// Client data for API responses
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Client {
    pub id: Option<i32>,
    pub owner_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cep: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

/// Filter criteria for client queries
#[derive(Debug, Default, Clone)]
pub struct ClientFilter {
    pub owner_id: Option<i32>,
    pub is_active: Option<bool>,
    pub name: Option<String>,
}

/// Input for creating a client
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateClientInput {
    pub owner_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cep: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a client
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub cep: Option<Option<String>>,
    pub street_address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub birth_date: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Repository trait for Client entity
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Find all clients matching the filter criteria
    async fn find_all(&self, filter: ClientFilter) -> Result<Vec<Client>, DomainError>;

    /// Find a client by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, DomainError>;

    /// Create a new client
    async fn create(&self, input: CreateClientInput) -> Result<Client, DomainError>;

    /// Update an existing client
    async fn update(&self, id: i32, input: UpdateClientInput) -> Result<Client, DomainError>;

    /// Deactivate a client (soft delete)
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

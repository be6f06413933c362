//! SeaORM implementation of ClientRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{Client, ClientFilter, ClientRepository, CreateClientInput, DomainError,
    UpdateClientInput};
use crate::models::client::{self, ActiveModel, Entity as ClientEntity};

fn to_domain(model: client::Model) -> Client {
    Client {
        id: Some(model.id),
        owner_id: model.owner_id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        cep: model.cep,
        street_address: model.street_address,
        city: model.city,
        state: model.state,
        birth_date: model.birth_date,
        notes: model.notes,
        is_active: model.is_active,
    }
}

/// SeaORM-based implementation of ClientRepository
pub struct SeaOrmClientRepository {
    db: DatabaseConnection,
}

impl SeaOrmClientRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClientRepository for SeaOrmClientRepository {
    async fn find_all(&self, filter: ClientFilter) -> Result<Vec<Client>, DomainError> {
        let mut condition = Condition::all();

        if let Some(owner_id) = filter.owner_id {
            condition = condition.add(client::Column::OwnerId.eq(owner_id));
        }

        if let Some(is_active) = filter.is_active {
            condition = condition.add(client::Column::IsActive.eq(is_active));
        }

        if let Some(name) = filter.name {
            condition = condition.add(client::Column::Name.contains(&name));
        }

        let clients = ClientEntity::find()
            .filter(condition)
            .order_by_asc(client::Column::Name)
            .all(&self.db)
            .await?;

        Ok(clients.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, DomainError> {
        let client = ClientEntity::find_by_id(id).one(&self.db).await?;

        Ok(client.map(to_domain))
    }

    async fn create(&self, input: CreateClientInput) -> Result<Client, DomainError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "client name must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();

        let new_client = ActiveModel {
            owner_id: Set(input.owner_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            cep: Set(input.cep),
            street_address: Set(input.street_address),
            city: Set(input.city),
            state: Set(input.state),
            birth_date: Set(input.birth_date),
            notes: Set(input.notes),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_client.insert(&self.db).await?;

        Ok(to_domain(result))
    }

    async fn update(&self, id: i32, input: UpdateClientInput) -> Result<Client, DomainError> {
        let client = ClientEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        if input.name.as_deref().map_or(false, |n| n.trim().is_empty()) {
            return Err(DomainError::Validation(
                "client name must not be empty".to_string(),
            ));
        }

        let mut active: ActiveModel = client.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(cep) = input.cep {
            active.cep = Set(cep);
        }
        if let Some(street_address) = input.street_address {
            active.street_address = Set(street_address);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(birth_date) = input.birth_date {
            active.birth_date = Set(birth_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;

        Ok(to_domain(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let client = ClientEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = client.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active.update(&self.db).await?;
        Ok(())
    }
}

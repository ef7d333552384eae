use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::access::{AccessService, Action, ResourceKind};
use crate::features::auth::model::Requester;
use crate::features::waste_types::models::{WasteType, WasteTypeFields};
use crate::features::waste_types::repositories::WasteTypeRepository;
use crate::shared::types::PaginationQuery;

/// Waste type catalog: public reads, admin-only writes
pub struct WasteTypeService {
    repository: Arc<dyn WasteTypeRepository>,
    access: Arc<AccessService>,
}

impl WasteTypeService {
    pub fn new(repository: Arc<dyn WasteTypeRepository>, access: Arc<AccessService>) -> Self {
        Self { repository, access }
    }

    pub async fn list(
        &self,
        requester: &Requester,
        search: Option<&str>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<WasteType>, i64)> {
        self.check(requester, Action::List).await?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repository.list(search, pagination).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<WasteType> {
        self.check(requester, Action::Retrieve).await?;

        self.repository
            .find(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, requester: &Requester, fields: WasteTypeFields) -> Result<WasteType> {
        self.check(requester, Action::Create).await?;

        let created = self.repository.create(fields).await?;
        tracing::info!(id = %created.id, name = %created.name, "Waste type created");
        Ok(created)
    }

    /// Replace name and description
    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        fields: WasteTypeFields,
    ) -> Result<WasteType> {
        self.check(requester, Action::Update).await?;

        self.repository
            .update(id, fields)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<()> {
        self.check(requester, Action::Delete).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id = %id, "Waste type deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.repository.count().await
    }

    async fn check(&self, requester: &Requester, action: Action) -> Result<()> {
        let principal = self.access.resolve(requester).await;
        self.access
            .enforce(&principal, action, ResourceKind::WasteType, None)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Waste type {} not found", id))
}

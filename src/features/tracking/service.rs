use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::record::{
    NewTrackedRecord, RecordPatch, TrackedDraft, TrackedRecord, TrackedResource,
    COMMON_PATCH_FIELDS,
};
use super::repository::TrackedRecordRepository;
use super::status::StatusLifecycle;
use crate::core::error::{AppError, Result};
use crate::features::access::scope::scope;
use crate::features::access::{
    classify_patch, AccessService, Action, ListFilters, Principal, QuerySpec, Target,
};
use crate::features::auth::model::Requester;
use crate::shared::types::FieldErrors;

const LABEL_MAX_LENGTH: usize = 100;

/// Which PATCH endpoint a change came through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    /// General partial update; the field set decides the action
    Fields,
    /// Dedicated status endpoint; `status` must be present
    StatusOnly,
}

/// Scoped, policy-checked operations over one tracked resource kind
pub struct TrackedRecordService<R: TrackedResource> {
    repository: Arc<dyn TrackedRecordRepository<R>>,
    access: Arc<AccessService>,
}

impl<R: TrackedResource> TrackedRecordService<R> {
    pub fn new(repository: Arc<dyn TrackedRecordRepository<R>>, access: Arc<AccessService>) -> Self {
        Self { repository, access }
    }

    /// Records visible to the requester, filtered and paged
    pub async fn list(
        &self,
        requester: &Requester,
        filters: ListFilters<R::Status>,
    ) -> Result<(Vec<TrackedRecord<R>>, i64)> {
        let principal = self.access.resolve(requester).await;
        self.access.enforce(&principal, Action::List, R::KIND, None)?;

        let spec = QuerySpec::for_principal(&principal, R::KIND, filters);
        self.repository.list(&spec).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<TrackedRecord<R>> {
        let principal = self.access.resolve(requester).await;
        self.load_for(&principal, Action::Retrieve, id).await
    }

    /// Persist a new record owned by the requester in the initial status
    pub async fn create(&self, requester: &Requester, draft: TrackedDraft<R>) -> Result<TrackedRecord<R>> {
        let principal = self.access.resolve(requester).await;
        self.access.enforce(&principal, Action::Create, R::KIND, None)?;

        let owner_id = principal
            .subject()
            .map(|s| s.identity_id)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let record = self
            .repository
            .insert(NewTrackedRecord {
                owner_id,
                waste_type: draft.waste_type,
                location: draft.location,
                status: R::Status::INITIAL,
                details: draft.details,
            })
            .await?;

        tracing::info!(id = %record.id, owner_id = %owner_id, "{} created", R::LABEL);
        Ok(record)
    }

    /// Apply a partial update.
    ///
    /// A payload consisting of `status` alone is a status change; anything
    /// else is a general update and needs the matching permission.
    pub async fn patch(
        &self,
        requester: &Requester,
        id: Uuid,
        payload: Map<String, Value>,
        mode: PatchMode,
    ) -> Result<TrackedRecord<R>> {
        if mode == PatchMode::StatusOnly && !payload.contains_key("status") {
            return Err(AppError::field("status", "This field is required."));
        }
        check_patch_keys::<R>(&payload)?;

        let action = classify_patch(payload.keys().map(String::as_str));
        let principal = self.access.resolve(requester).await;
        let mut record = self.load_for(&principal, action, id).await?;

        let patch: RecordPatch<R::DetailsPatch> = serde_json::from_value(Value::Object(payload))
            .map_err(|e| AppError::BadRequest(format!("Invalid {} data: {}", R::LABEL, e)))?;

        let previous_status = record.status;
        apply_patch::<R>(&mut record, patch)?;

        let saved = self
            .repository
            .save(&record)
            .await?
            .ok_or_else(|| not_found::<R>(id))?;

        if saved.status != previous_status {
            tracing::info!(
                id = %saved.id,
                from = previous_status.as_str(),
                to = saved.status.as_str(),
                "{} status changed",
                R::LABEL
            );
        }

        Ok(saved)
    }

    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<()> {
        let principal = self.access.resolve(requester).await;
        self.load_for(&principal, Action::Delete, id).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found::<R>(id));
        }

        tracing::info!(id = %id, "{} deleted", R::LABEL);
        Ok(())
    }

    /// Unscoped count, for aggregate statistics
    pub async fn count(&self, status: Option<R::Status>) -> Result<i64> {
        self.repository.count(status).await
    }

    /// Check `action` at kind level, fetch inside the principal's scope,
    /// then check again against the record's owner
    async fn load_for(&self, principal: &Principal, action: Action, id: Uuid) -> Result<TrackedRecord<R>> {
        self.access.enforce(principal, action, R::KIND, None)?;

        let visibility = scope(principal, R::KIND);
        let record = self
            .repository
            .find(id, &visibility)
            .await?
            .ok_or_else(|| not_found::<R>(id))?;

        self.access.enforce(
            principal,
            action,
            R::KIND,
            Some(&Target {
                owner_id: record.owner_id,
            }),
        )?;

        Ok(record)
    }
}

fn not_found<R: TrackedResource>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", R::LABEL, id))
}

/// Read-only and unknown keys are errors rather than silently dropped
fn check_patch_keys<R: TrackedResource>(payload: &Map<String, Value>) -> Result<()> {
    let errors: FieldErrors = payload
        .keys()
        .filter(|key| {
            !COMMON_PATCH_FIELDS.contains(&key.as_str())
                && !R::DETAIL_COLUMNS.contains(&key.as_str())
        })
        .map(|key| (key.clone(), vec!["This field cannot be updated.".to_string()]))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::FieldValidation(errors))
    }
}

fn check_label(errors: &mut FieldErrors, field: &str, value: &str) {
    let message = if value.trim().is_empty() {
        "This field may not be blank."
    } else if value.chars().count() > LABEL_MAX_LENGTH {
        "Ensure this field has no more than 100 characters."
    } else {
        return;
    };
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn apply_patch<R: TrackedResource>(
    record: &mut TrackedRecord<R>,
    patch: RecordPatch<R::DetailsPatch>,
) -> Result<()> {
    let mut errors = FieldErrors::new();

    if let Some(waste_type) = &patch.waste_type {
        check_label(&mut errors, "waste_type", waste_type);
    }
    if let Some(location) = &patch.location {
        check_label(&mut errors, "location", location);
    }
    if !errors.is_empty() {
        return Err(AppError::FieldValidation(errors));
    }

    if let Some(status) = &patch.status {
        record.status = R::Status::parse_field(status)?;
    }
    R::apply_patch(&mut record.details, patch.details)?;

    if let Some(waste_type) = patch.waste_type {
        record.waste_type = waste_type;
    }
    if let Some(location) = patch.location {
        record.location = location;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use fake::faker::address::en::CityName;
    use fake::Fake;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::features::reports::models::{ReportDetails, ReportResource, ReportStatus};
    use crate::features::users::models::Role;
    use crate::features::wastes::models::{WasteDetails, WasteResource, WasteStatus};
    use crate::shared::test_helpers::TestContext;

    fn report(waste_type: &str, location: &str) -> TrackedDraft<ReportResource> {
        TrackedDraft {
            waste_type: waste_type.to_string(),
            location: location.to_string(),
            details: ReportDetails {
                description: "Overflowing bins".to_string(),
                image: None,
            },
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_role() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let bob = ctx.seed_with_role("bob", Role::Citizen).await;
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let root = ctx.seed_identity("root", "root-password", true).await;

        let mine = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();
        for _ in 0..3 {
            ctx.reports.create(&ctx.requester(&bob), report("Glass", "Harbour")).await.unwrap();
        }

        let (records, total) = ctx
            .reports
            .list(&ctx.requester(&alice), ListFilters::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].id, mine.id);
        assert_eq!(records[0].owner.as_ref().map(|o| o.username.as_str()), Some("alice"));

        for elevated in [&olga, &root] {
            let (_, total) = ctx
                .reports
                .list(&ctx.requester(elevated), ListFilters::default())
                .await
                .unwrap();
            assert_eq!(total, 4);
        }

        let (records, total) = ctx
            .reports
            .list(&Requester::Anonymous, ListFilters::default())
            .await
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_citizen_sees_exactly_own_subset() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let bob = ctx.seed_with_role("bob", Role::Citizen).await;

        let owned: usize = (0..5).fake();
        let foreign: usize = (1..8).fake();
        let mut expected = Vec::new();
        for _ in 0..owned {
            let location: String = CityName().fake();
            let created = ctx.reports.create(&ctx.requester(&alice), report("Paper", &location)).await.unwrap();
            expected.push(created.id);
        }
        for _ in 0..foreign {
            let location: String = CityName().fake();
            ctx.reports.create(&ctx.requester(&bob), report("Paper", &location)).await.unwrap();
        }

        let (records, total) = ctx
            .reports
            .list(&ctx.requester(&alice), ListFilters::default())
            .await
            .unwrap();
        let mut seen: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        seen.sort();
        expected.sort();
        assert_eq!(seen, expected);
        assert_eq!(total, owned as i64);
        assert!(records.iter().all(|r| r.owner_id == Some(alice.id)));
    }

    #[tokio::test]
    async fn test_citizen_without_records_sees_nothing() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let bob = ctx.seed_with_role("bob", Role::Citizen).await;
        ctx.reports.create(&ctx.requester(&bob), report("Glass", "Harbour")).await.unwrap();

        let (records, _) = ctx
            .reports
            .list(&ctx.requester(&alice), ListFilters::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_search_and_status_filters() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let as_alice = ctx.requester(&alice);

        let plastic = ctx.reports.create(&as_alice, report("Plastic", "Market")).await.unwrap();
        ctx.reports.create(&as_alice, report("Glass", "Plaza")).await.unwrap();
        ctx.reports.create(&as_alice, report("Metal", "Depot")).await.unwrap();

        ctx.reports
            .patch(&ctx.requester(&olga), plastic.id, payload(json!({"status": "in_progress"})), PatchMode::StatusOnly)
            .await
            .unwrap();

        let search = ListFilters {
            search: Some("pla".to_string()),
            ..Default::default()
        };
        let (_, total) = ctx.reports.list(&as_alice, search).await.unwrap();
        assert_eq!(total, 2);

        let in_progress = ListFilters {
            status: Some(ReportStatus::InProgress),
            ..Default::default()
        };
        let (records, total) = ctx.reports.list(&as_alice, in_progress).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].id, plastic.id);
    }

    #[tokio::test]
    async fn test_create_assigns_owner_and_initial_status() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;

        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();
        assert_eq!(created.owner_id, Some(alice.id));
        assert_eq!(created.status, ReportStatus::Pending);

        let anonymous = ctx.reports.create(&Requester::Anonymous, report("Plastic", "Market")).await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_officers_file_wastes_but_not_reports() {
        let ctx = TestContext::new();
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let as_olga = ctx.requester(&olga);

        let report_result = ctx.reports.create(&as_olga, report("Plastic", "Market")).await;
        assert!(matches!(report_result, Err(AppError::Forbidden(_))));

        let waste = ctx
            .wastes
            .create(
                &as_olga,
                TrackedDraft::<WasteResource> {
                    waste_type: "Organic".to_string(),
                    location: "Depot".to_string(),
                    details: WasteDetails { quantity: 12.5 },
                },
            )
            .await
            .unwrap();
        assert_eq!(waste.status, WasteStatus::Pending);
    }

    #[tokio::test]
    async fn test_officer_status_update_is_visible_to_owner() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();

        let updated = ctx
            .reports
            .patch(&ctx.requester(&olga), created.id, payload(json!({"status": "resolved"})), PatchMode::StatusOnly)
            .await
            .unwrap();
        assert_eq!(updated.status, ReportStatus::Resolved);

        let fetched = ctx.reports.get(&ctx.requester(&alice), created.id).await.unwrap();
        assert_eq!(fetched.status, ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn test_officer_cannot_mix_status_with_other_fields() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();

        for mode in [PatchMode::StatusOnly, PatchMode::Fields] {
            let result = ctx
                .reports
                .patch(
                    &ctx.requester(&olga),
                    created.id,
                    payload(json!({"status": "resolved", "location": "Elsewhere"})),
                    mode,
                )
                .await;
            assert!(matches!(result, Err(AppError::Forbidden(_))), "{:?}", mode);
        }

        let unchanged = ctx.reports.get(&ctx.requester(&alice), created.id).await.unwrap();
        assert_eq!(unchanged.status, ReportStatus::Pending);
        assert_eq!(unchanged.location, "Market");
    }

    #[tokio::test]
    async fn test_citizens_cannot_change_status() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let bob = ctx.seed_with_role("bob", Role::Citizen).await;
        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();

        for citizen in [&alice, &bob] {
            let result = ctx
                .reports
                .patch(&ctx.requester(citizen), created.id, payload(json!({"status": "resolved"})), PatchMode::StatusOnly)
                .await;
            assert!(matches!(result, Err(AppError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn test_status_values_are_per_resource() {
        let ctx = TestContext::new();
        let root = ctx.seed_identity("root", "root-password", true).await;
        let as_root = ctx.requester(&root);
        let created = ctx.reports.create(&as_root, report("Plastic", "Market")).await.unwrap();

        // "collected" belongs to wastes only
        match ctx
            .reports
            .patch(&as_root, created.id, payload(json!({"status": "collected"})), PatchMode::StatusOnly)
            .await
        {
            Err(AppError::FieldValidation(fields)) => assert!(fields.contains_key("status")),
            other => panic!("unexpected result: {:?}", other),
        }

        match ctx
            .reports
            .patch(&as_root, created.id, payload(json!({})), PatchMode::StatusOnly)
            .await
        {
            Err(AppError::FieldValidation(fields)) => assert_eq!(
                fields.get("status"),
                Some(&vec!["This field is required.".to_string()])
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admin_general_update_validates_labels() {
        let ctx = TestContext::new();
        let root = ctx.seed_identity("root", "root-password", true).await;
        let as_root = ctx.requester(&root);
        let created = ctx.reports.create(&as_root, report("Plastic", "Market")).await.unwrap();

        let updated = ctx
            .reports
            .patch(
                &as_root,
                created.id,
                payload(json!({"location": "Harbour", "description": "Cleared half"})),
                PatchMode::Fields,
            )
            .await
            .unwrap();
        assert_eq!(updated.location, "Harbour");
        assert_eq!(updated.details.description, "Cleared half");

        match ctx
            .reports
            .patch(&as_root, created.id, payload(json!({"waste_type": "  "})), PatchMode::Fields)
            .await
        {
            Err(AppError::FieldValidation(fields)) => assert!(fields.contains_key("waste_type")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_only_keys_are_rejected() {
        let ctx = TestContext::new();
        let root = ctx.seed_identity("root", "root-password", true).await;
        let as_root = ctx.requester(&root);
        let created = ctx.reports.create(&as_root, report("Plastic", "Market")).await.unwrap();

        let result = ctx
            .reports
            .patch(
                &as_root,
                created.id,
                payload(json!({"user": Uuid::new_v4(), "time_created": "2020-01-01T00:00:00Z"})),
                PatchMode::Fields,
            )
            .await;
        match result {
            Err(AppError::FieldValidation(fields)) => {
                assert!(fields.contains_key("user"));
                assert!(fields.contains_key("time_created"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // Detail columns of one resource are not writable on the other
        let waste = ctx
            .wastes
            .create(
                &as_root,
                TrackedDraft {
                    waste_type: "Glass".to_string(),
                    location: "Depot".to_string(),
                    details: WasteDetails { quantity: 2.0 },
                },
            )
            .await
            .unwrap();
        assert_err!(
            ctx.wastes
                .patch(&as_root, waste.id, payload(json!({"description": "x"})), PatchMode::Fields)
                .await
        );

        let unchanged = ctx.reports.get(&as_root, created.id).await.unwrap();
        assert_eq!(unchanged.owner_id, Some(root.id));
        assert_eq!(unchanged.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let olga = ctx.seed_with_role("olga", Role::Officer).await;
        let root = ctx.seed_identity("root", "root-password", true).await;
        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();

        for denied in [&alice, &olga] {
            let result = ctx.reports.delete(&ctx.requester(denied), created.id).await;
            assert!(matches!(result, Err(AppError::Forbidden(_))));
        }

        assert_ok!(ctx.reports.delete(&ctx.requester(&root), created.id).await);
        let again = assert_err!(ctx.reports.delete(&ctx.requester(&root), created.id).await);
        assert!(matches!(again, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_other_citizens_records_are_not_found() {
        let ctx = TestContext::new();
        let alice = ctx.seed_with_role("alice", Role::Citizen).await;
        let bob = ctx.seed_with_role("bob", Role::Citizen).await;
        let created = ctx.reports.create(&ctx.requester(&alice), report("Plastic", "Market")).await.unwrap();

        let result = ctx.reports.get(&ctx.requester(&bob), created.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let anonymous = ctx.reports.get(&Requester::Anonymous, created.id).await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));
    }
}

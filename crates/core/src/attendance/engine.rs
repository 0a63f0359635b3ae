//! The attendance engine.
//!
//! Enforces capability checks, window gating, one-record-per-member, and
//! owner-only updates, and keeps the aggregated result cache warm. The engine
//! holds no mutable state of its own; everything shared lives behind the
//! repository and cache ports.

use std::time::Duration;

use validator::Validate;

use crate::attendance::model::{
    AggregatedResult, AttendanceForm, AttendanceRecord, FormInput, FormUpdate, NewAttendanceForm,
    NewAttendanceRecord,
};
use crate::attendance::ports::{AttendanceRepository, RepositoryError, ResultCache};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::rbac::{Action, AuthorizationGate, Principal, Resource};
use crate::status::parse_status;
use crate::types::DbId;
use crate::window::{self, Writability};

/// Returned for denied capabilities, closed forms, and foreign records alike.
const FORBIDDEN: &str = "action is forbidden";

/// Default lifetime of a cached aggregated result.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a written-back aggregated result stays valid in the cache.
    pub result_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }
}

pub struct AttendanceEngine<R, C, G, K> {
    repo: R,
    cache: C,
    gate: G,
    clock: K,
    config: EngineConfig,
}

impl<R, C, G, K> AttendanceEngine<R, C, G, K>
where
    R: AttendanceRepository,
    C: ResultCache,
    G: AuthorizationGate,
    K: Clock,
{
    pub fn new(repo: R, cache: C, gate: G, clock: K, config: EngineConfig) -> Self {
        Self {
            repo,
            cache,
            gate,
            clock,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    /// Open a new form. Requires the create-form capability.
    #[tracing::instrument(skip(self, principal, input), fields(principal_id = principal.id))]
    pub async fn create_form(
        &self,
        principal: &Principal,
        input: FormInput,
    ) -> Result<AttendanceForm, CoreError> {
        self.authorize(principal, Resource::AbsentForm, Action::CreateAny)?;
        let input = self.validate_form_input(input)?;

        let new_form = NewAttendanceForm {
            title: input.title,
            participant_group_id: input.participant_group_id,
            start_at: input.start_at,
            finish_at: input.finish_at,
            allow_update_by_attendee: input.allow_update_by_attendee,
            created_by: principal.id,
        };
        let form = self
            .repo
            .create_form(&new_form)
            .await
            .map_err(|e| internal("create form", e))?;

        tracing::info!(form_id = form.id, "Attendance form created");
        Ok(form)
    }

    /// List non-deleted forms. `limit <= 0` means no limit.
    #[tracing::instrument(skip(self, principal), fields(principal_id = principal.id))]
    pub async fn list_forms(
        &self,
        principal: &Principal,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AttendanceForm>, CoreError> {
        self.authorize(principal, Resource::AbsentForm, Action::ReadAll)?;

        let limit = (limit > 0).then_some(limit);
        self.repo
            .list_forms(limit, offset.max(0))
            .await
            .map_err(|e| internal("list forms", e))
    }

    /// Fetch a single non-deleted form.
    #[tracing::instrument(skip(self, principal), fields(principal_id = principal.id))]
    pub async fn get_form(
        &self,
        principal: &Principal,
        form_id: DbId,
    ) -> Result<AttendanceForm, CoreError> {
        self.authorize(principal, Resource::AbsentForm, Action::ReadAny)?;

        let form = self.load_form(form_id).await?;
        if form.is_deleted() {
            return Err(form_not_found(form_id));
        }
        Ok(form)
    }

    /// Replace a form's title, group, window, and attendee-update flag.
    ///
    /// Rejected with `Forbidden` once any record on the form is settled.
    #[tracing::instrument(skip(self, principal, input), fields(principal_id = principal.id))]
    pub async fn update_form_metadata(
        &self,
        principal: &Principal,
        form_id: DbId,
        input: FormInput,
    ) -> Result<AttendanceForm, CoreError> {
        self.authorize(principal, Resource::AbsentForm, Action::UpdateAny)?;
        let input = self.validate_form_input(input)?;

        let existing = self.load_form(form_id).await?;
        if existing.is_deleted() {
            return Err(form_not_found(form_id));
        }

        let locked = self
            .repo
            .has_settled_records(form_id)
            .await
            .map_err(|e| internal("check settled records", e))?;
        if locked {
            tracing::debug!(form_id, "Form metadata locked by settled records");
            return Err(CoreError::Forbidden(FORBIDDEN.into()));
        }

        let update = FormUpdate {
            title: input.title,
            participant_group_id: input.participant_group_id,
            start_at: input.start_at,
            finish_at: input.finish_at,
            allow_update_by_attendee: input.allow_update_by_attendee,
            updated_by: principal.id,
        };
        let form = match self.repo.update_form(form_id, &update).await {
            Ok(Some(form)) => form,
            Ok(None) => return Err(form_not_found(form_id)),
            Err(RepositoryError::Locked) => {
                tracing::debug!(form_id, "Record settled while form update was in flight");
                return Err(CoreError::Forbidden(FORBIDDEN.into()));
            }
            Err(e) => return Err(internal("update form", e)),
        };

        tracing::info!(form_id, "Attendance form updated");
        self.refresh_aggregated_result(form_id).await;
        Ok(form)
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Submit the caller's single record on an open form.
    #[tracing::instrument(skip(self, principal, reason), fields(member_id = principal.id))]
    pub async fn submit_record(
        &self,
        principal: &Principal,
        form_id: DbId,
        status_raw: &str,
        reason: Option<String>,
    ) -> Result<AttendanceRecord, CoreError> {
        self.authorize(principal, Resource::AbsentList, Action::CreateAny)?;
        let status = parse_status(status_raw)?;

        let form = self.load_form(form_id).await?;
        self.require_open(&form)?;

        let existing = self
            .repo
            .find_record_by_member(form_id, principal.id)
            .await
            .map_err(|e| internal("find record by member", e))?;
        if existing.is_some() {
            return Err(already_submitted());
        }

        let new_record = NewAttendanceRecord {
            form_id,
            member_id: principal.id,
            status,
            reason: normalize_reason(reason),
        };
        let record = match self.repo.create_record(&new_record).await {
            Ok(record) => record,
            Err(RepositoryError::Conflict(detail)) => {
                tracing::warn!(%detail, "Concurrent duplicate submission rejected by repository");
                return Err(already_submitted());
            }
            Err(e) => return Err(internal("create record", e)),
        };

        tracing::info!(record_id = record.id, status = %record.status, "Attendance record submitted");
        self.refresh_aggregated_result(form_id).await;
        Ok(record)
    }

    /// Let a member change the status and reason of their own record.
    ///
    /// The form must allow attendee updates and still be open.
    #[tracing::instrument(skip(self, principal, reason), fields(member_id = principal.id))]
    pub async fn update_record_by_owner(
        &self,
        principal: &Principal,
        form_id: DbId,
        record_id: DbId,
        status_raw: &str,
        reason: Option<String>,
    ) -> Result<AttendanceRecord, CoreError> {
        self.authorize(principal, Resource::AbsentList, Action::CreateAny)?;
        let status = parse_status(status_raw)?;

        let form = self.load_form(form_id).await?;
        if !form.allow_update_by_attendee {
            tracing::debug!("Form does not allow attendee updates");
            return Err(CoreError::Forbidden(FORBIDDEN.into()));
        }
        self.require_open(&form)?;

        let mut record = self
            .repo
            .find_record(form_id, record_id)
            .await
            .map_err(|e| internal("find record", e))?
            .ok_or(CoreError::NotFound {
                entity: "AttendanceRecord",
                id: record_id,
            })?;

        if record.member_id != principal.id {
            tracing::debug!(owner_id = record.member_id, "Record belongs to another member");
            return Err(CoreError::Forbidden(FORBIDDEN.into()));
        }

        record.status = status;
        record.reason = normalize_reason(reason);

        let updated = match self.repo.update_record(&record).await {
            Ok(updated) => updated,
            Err(RepositoryError::NotFound) => {
                return Err(CoreError::NotFound {
                    entity: "AttendanceRecord",
                    id: record_id,
                })
            }
            Err(e) => return Err(internal("update record", e)),
        };

        tracing::info!(status = %updated.status, "Attendance record updated by owner");
        self.refresh_aggregated_result(form_id).await;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Aggregated result
    // -----------------------------------------------------------------------

    /// Cache-aside read of a form's aggregated result.
    ///
    /// A cache miss, a cache error, and an undecodable cached payload all fall
    /// through to the repository; none of them fails the call.
    #[tracing::instrument(skip(self))]
    pub async fn get_aggregated_result(&self, form_id: DbId) -> Result<AggregatedResult, CoreError> {
        let key = AggregatedResult::cache_key(form_id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<AggregatedResult>(&payload) {
                Ok(result) => {
                    tracing::debug!("Aggregated result cache hit");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undecodable cached result");
                }
            },
            Ok(None) => tracing::debug!("Aggregated result cache miss"),
            Err(e) => {
                tracing::warn!(error = %e, "Result cache read failed, falling back to repository");
            }
        }

        let result = self.assemble_result(form_id).await?;
        self.store_result(&key, &result).await;
        Ok(result)
    }

    /// Recompute a form's result and overwrite its cache entry.
    ///
    /// This is the invalidation step run after every successful write:
    /// overwriting instead of deleting keeps the next reader on the fast path.
    /// Failures are logged and reported as `false`, never propagated.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_aggregated_result(&self, form_id: DbId) -> bool {
        let result = match self.assemble_result(form_id).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Could not rebuild aggregated result; cache may be stale");
                return false;
            }
        };
        self.store_result(&AggregatedResult::cache_key(form_id), &result)
            .await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Check a capability without doing anything else.
    ///
    /// Transports call this before parsing a request body so that an
    /// unauthorized caller learns nothing from validation or lookups.
    pub fn authorize(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
    ) -> Result<(), CoreError> {
        if self.gate.has_capability(principal, resource, action) {
            Ok(())
        } else {
            tracing::debug!(?resource, ?action, role = principal.role.as_str(), "Capability denied");
            Err(CoreError::Forbidden(FORBIDDEN.into()))
        }
    }

    /// Every non-open state yields the same error; the precise reason only
    /// reaches the debug log.
    fn require_open(&self, form: &AttendanceForm) -> Result<(), CoreError> {
        match window::writability(form, self.clock.now()) {
            Writability::Open => Ok(()),
            state => {
                tracing::debug!(form_id = form.id, state = state.as_str(), "Form is not open");
                Err(CoreError::Forbidden(FORBIDDEN.into()))
            }
        }
    }

    fn validate_form_input(&self, mut input: FormInput) -> Result<FormInput, CoreError> {
        input.title = input.title.trim().to_string();
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        window::validate_window(input.start_at, input.finish_at, self.clock.now())?;
        Ok(input)
    }

    async fn load_form(&self, form_id: DbId) -> Result<AttendanceForm, CoreError> {
        self.repo
            .find_form(form_id)
            .await
            .map_err(|e| internal("find form", e))?
            .ok_or_else(|| form_not_found(form_id))
    }

    async fn assemble_result(&self, form_id: DbId) -> Result<AggregatedResult, CoreError> {
        let form = self.load_form(form_id).await?;
        let participants = self
            .repo
            .list_participants(form_id)
            .await
            .map_err(|e| internal("list participants", e))?;
        Ok(AggregatedResult::assemble(&form, participants))
    }

    async fn store_result(&self, key: &str, result: &AggregatedResult) -> bool {
        let payload = match serde_json::to_string(result) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Could not encode aggregated result");
                return false;
            }
        };
        match self.cache.set(key, payload, self.config.result_ttl).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, key, "Result cache write failed");
                false
            }
        }
    }
}

fn form_not_found(form_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "AttendanceForm",
        id: form_id,
    }
}

fn already_submitted() -> CoreError {
    CoreError::AlreadyExists("attendance record already submitted for this form".into())
}

/// Log a repository failure with its context and collapse it to `Internal`.
fn internal(context: &'static str, err: RepositoryError) -> CoreError {
    tracing::error!(error = %err, context, "Repository failure");
    CoreError::Internal(format!("{context}: {err}"))
}

fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

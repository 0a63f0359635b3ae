//! In-memory doubles for the engine's ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use absensi_core::attendance::model::{
    AttendanceForm, AttendanceRecord, FormUpdate, NewAttendanceForm, NewAttendanceRecord,
    Participant,
};
use absensi_core::attendance::ports::{
    AttendanceRepository, CacheError, RepositoryError, ResultCache,
};
use absensi_core::attendance::{AttendanceEngine, EngineConfig};
use absensi_core::cache::InMemoryResultCache;
use absensi_core::clock::ManualClock;
use absensi_core::rbac::{Principal, Role, RolePermissions};
use absensi_core::status::AttendanceStatus;
use absensi_core::types::{DbId, Timestamp};
use chrono::{TimeZone, Utc};

pub type TestEngine = AttendanceEngine<MemoryRepository, CountingCache, RolePermissions, ManualClock>;

pub const ADMIN_ID: DbId = 1;

/// Fixed "now" every test starts from: 2024-03-01 09:00 UTC.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn admin() -> Principal {
    Principal::new(ADMIN_ID, Role::Admin)
}

pub fn member(id: DbId) -> Principal {
    Principal::new(id, Role::Member)
}

pub fn engine() -> TestEngine {
    engine_with_cache(CountingCache::default())
}

pub fn engine_with_cache<C: ResultCache>(
    cache: C,
) -> AttendanceEngine<MemoryRepository, C, RolePermissions, ManualClock> {
    AttendanceEngine::new(
        MemoryRepository::default(),
        cache,
        RolePermissions,
        ManualClock::new(t0()),
        EngineConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    forms: Vec<AttendanceForm>,
    records: Vec<AttendanceRecord>,
    members: HashMap<DbId, String>,
    next_form_id: DbId,
    next_record_id: DbId,
}

/// Vec-backed repository that enforces `(form_id, member_id)` uniqueness
/// on insert, the same way the database constraint does.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
    /// Yield to the scheduler after answering `find_record_by_member`, so
    /// two joined submissions both pass the pre-check.
    yield_after_lookup: AtomicBool,
    /// Settle every record on the form right after `has_settled_records`
    /// answers, as a member would between the check and the write.
    settle_after_check: AtomicBool,
    pub create_record_calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn yield_after_lookup(&self) {
        self.yield_after_lookup.store(true, Ordering::SeqCst);
    }

    pub fn settle_after_check(&self) {
        self.settle_after_check.store(true, Ordering::SeqCst);
    }

    pub fn add_member(&self, id: DbId, name: &str) {
        self.tables.lock().unwrap().members.insert(id, name.to_string());
    }

    /// Insert a form directly, bypassing engine validation.
    pub fn insert_form(&self, start_at: Timestamp, finish_at: Timestamp, allow_update: bool) -> DbId {
        let mut tables = self.tables.lock().unwrap();
        tables.next_form_id += 1;
        let id = tables.next_form_id;
        tables.forms.push(AttendanceForm {
            id,
            title: format!("Form {id}"),
            participant_group_id: 1,
            start_at,
            finish_at,
            allow_update_by_attendee: allow_update,
            created_by: ADMIN_ID,
            updated_by: ADMIN_ID,
            created_at: start_at,
            updated_at: start_at,
            deleted_at: None,
            deleted_by: None,
        });
        id
    }

    pub fn soft_delete_form(&self, form_id: DbId) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(form) = tables.forms.iter_mut().find(|f| f.id == form_id) {
            form.deleted_at = Some(t0());
            form.deleted_by = Some(ADMIN_ID);
        }
    }

    pub fn records_for(&self, form_id: DbId) -> Vec<AttendanceRecord> {
        self.tables
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.form_id == form_id)
            .cloned()
            .collect()
    }
}

impl AttendanceRepository for MemoryRepository {
    async fn find_form(&self, form_id: DbId) -> Result<Option<AttendanceForm>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.forms.iter().find(|f| f.id == form_id).cloned())
    }

    async fn list_forms(
        &self,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<AttendanceForm>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let live = tables
            .forms
            .iter()
            .rev()
            .filter(|f| !f.is_deleted())
            .skip(offset as usize)
            .cloned();
        Ok(match limit {
            Some(n) => live.take(n as usize).collect(),
            None => live.collect(),
        })
    }

    async fn create_form(&self, input: &NewAttendanceForm) -> Result<AttendanceForm, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_form_id += 1;
        let form = AttendanceForm {
            id: tables.next_form_id,
            title: input.title.clone(),
            participant_group_id: input.participant_group_id,
            start_at: input.start_at,
            finish_at: input.finish_at,
            allow_update_by_attendee: input.allow_update_by_attendee,
            created_by: input.created_by,
            updated_by: input.created_by,
            created_at: t0(),
            updated_at: t0(),
            deleted_at: None,
            deleted_by: None,
        };
        tables.forms.push(form.clone());
        Ok(form)
    }

    async fn update_form(
        &self,
        form_id: DbId,
        input: &FormUpdate,
    ) -> Result<Option<AttendanceForm>, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .records
            .iter()
            .any(|r| r.form_id == form_id && r.status.is_settled())
        {
            return Err(RepositoryError::Locked);
        }
        let Some(form) = tables
            .forms
            .iter_mut()
            .find(|f| f.id == form_id && !f.is_deleted())
        else {
            return Ok(None);
        };
        form.title = input.title.clone();
        form.participant_group_id = input.participant_group_id;
        form.start_at = input.start_at;
        form.finish_at = input.finish_at;
        form.allow_update_by_attendee = input.allow_update_by_attendee;
        form.updated_by = input.updated_by;
        Ok(Some(form.clone()))
    }

    async fn has_settled_records(&self, form_id: DbId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let settled = tables
            .records
            .iter()
            .any(|r| r.form_id == form_id && r.status.is_settled());
        if self.settle_after_check.load(Ordering::SeqCst) {
            for record in tables.records.iter_mut().filter(|r| r.form_id == form_id) {
                record.status = AttendanceStatus::Present;
            }
        }
        Ok(settled)
    }

    async fn find_record(
        &self,
        form_id: DbId,
        record_id: DbId,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .iter()
            .find(|r| r.form_id == form_id && r.id == record_id)
            .cloned())
    }

    async fn find_record_by_member(
        &self,
        form_id: DbId,
        member_id: DbId,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        let found = {
            let tables = self.tables.lock().unwrap();
            tables
                .records
                .iter()
                .find(|r| r.form_id == form_id && r.member_id == member_id)
                .cloned()
        };
        if self.yield_after_lookup.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(found)
    }

    async fn create_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError> {
        self.create_record_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        if tables
            .records
            .iter()
            .any(|r| r.form_id == input.form_id && r.member_id == input.member_id)
        {
            return Err(RepositoryError::Conflict(
                "uq_attendance_records_form_member".into(),
            ));
        }
        tables.next_record_id += 1;
        let now = Utc::now();
        let record = AttendanceRecord {
            id: tables.next_record_id,
            form_id: input.form_id,
            member_id: input.member_id,
            status: input.status,
            reason: input.reason.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        record: &AttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.status = record.status;
        stored.reason = record.reason.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_participants(&self, form_id: DbId) -> Result<Vec<Participant>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .iter()
            .filter(|r| r.form_id == form_id)
            .map(|r| Participant {
                member_id: r.member_id,
                member_name: tables
                    .members
                    .get(&r.member_id)
                    .cloned()
                    .unwrap_or_else(|| format!("member {}", r.member_id)),
                status: r.status,
                reason: r.reason.clone(),
                filled_at: r.updated_at,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Caches
// ---------------------------------------------------------------------------

/// [`InMemoryResultCache`] that counts reads and writes.
#[derive(Default)]
pub struct CountingCache {
    pub inner: InMemoryResultCache,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl CountingCache {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl ResultCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }
}

/// A cache whose every call fails, as when the backing store is down.
#[derive(Default)]
pub struct BrokenCache;

impl ResultCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError("connection refused".into()))
    }
}

//! Repository for reference records.
//!
//! Every method is a single round trip (or a single transaction), so callers
//! never hold a lock across store access; the constraints in the schema do
//! all the arbitration between concurrent writers.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{NewRecord, RecordRow, ReferenceRecord};
use exn::ResultExt;
use sqlx::SqlitePool;
use syscheck_models::{Algorithm, Digests, ReferenceStatus};
use time::UtcDateTime;

/// The column name is part of the query text, so each slot gets its own
/// fixed query rather than an interpolated identifier.
fn fill_query(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::Md5 => include_str!("../queries/fill_md5.sql"),
        Algorithm::Sha1 => include_str!("../queries/fill_sha1.sql"),
        Algorithm::Sha256 => include_str!("../queries/fill_sha256.sql"),
        Algorithm::Sha512 => include_str!("../queries/fill_sha512.sql"),
    }
}

/// Repository for looking up, inserting and reconciling reference records.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn now() -> i64 {
        UtcDateTime::now().unix_timestamp()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the record that any of the given digests belongs to.
    ///
    /// A record matches when at least one known digest equals the stored
    /// digest of the same algorithm; unknown digests never match anything.
    /// Should several records match (each on a different digest), the most
    /// severe status wins: malicious, then verified, then candidate.
    ///
    /// Returns `Ok(None)` when nothing matches. A failed query is always an
    /// `Err`, never a silent "not found".
    pub async fn find_by_digests(&self, digests: &Digests) -> Result<Option<ReferenceRecord>> {
        if digests.is_empty() {
            return Ok(None);
        }
        let row: Option<RecordRow> = sqlx::query_as(include_str!("../queries/find_by_digests.sql"))
            .bind(digests.md5.as_deref())
            .bind(digests.sha1.as_deref())
            .bind(digests.sha256.as_deref())
            .bind(digests.sha512.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(ErrorKind::database)?;
        row.map(ReferenceRecord::try_from).transpose()
    }

    pub async fn get(&self, id: i64) -> Result<Option<ReferenceRecord>> {
        let row: Option<RecordRow> = sqlx::query_as(include_str!("../queries/get_by_id.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ErrorKind::database)?;
        row.map(ReferenceRecord::try_from).transpose()
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count.sql"))
            .fetch_one(&self.pool)
            .await
            .map_err(ErrorKind::database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    pub async fn count_by_status(&self, status: ReferenceStatus) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_by_status.sql"))
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(ErrorKind::database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a record unless one of its digests is already taken.
    ///
    /// Returns `true` if the record was inserted and `false` if a unique
    /// digest constraint turned the insert into a no-op. Losing that race is
    /// not an error: the store's constraints are authoritative over whatever
    /// a single caller thought was (or wasn't) there.
    pub async fn insert_if_absent(&self, record: &NewRecord) -> Result<bool> {
        let size = i64::try_from(record.size).or_raise(|| ErrorKind::InvalidData("file size"))?;
        let result = sqlx::query(include_str!("../queries/insert_if_absent.sql"))
            .bind(record.digests.md5.as_deref())
            .bind(record.digests.sha1.as_deref())
            .bind(record.digests.sha256.as_deref())
            .bind(record.digests.sha512.as_deref())
            .bind(size)
            .bind(record.path.as_str())
            .bind(record.status.as_str())
            .bind(Self::now())
            .execute(&self.pool)
            .await
            .map_err(ErrorKind::database)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Reconcile
    // =========================================================================

    /// Fill the empty digest slots of record `id` from `digests`.
    ///
    /// Each slot is only written while it is still `NULL`, so a slot that
    /// already holds a value (including one written by a concurrent caller
    /// a moment ago) is never overwritten. A value that already belongs to a
    /// different record is skipped rather than failing the whole update.
    ///
    /// Returns the number of slots actually filled.
    pub async fn fill_missing_digests(&self, id: i64, digests: &Digests) -> Result<u64> {
        if digests.is_empty() {
            return Ok(0);
        }
        let now = Self::now();
        let mut tx = self.pool.begin().await.map_err(ErrorKind::database)?;
        let mut filled = 0;
        for (algorithm, value) in digests.iter() {
            let result = sqlx::query(fill_query(algorithm))
                .bind(value)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(ErrorKind::database)?;
            filled += result.rows_affected();
        }
        tx.commit().await.map_err(ErrorKind::database)?;
        Ok(filled)
    }
}

/*!
 * Transaction scope helper
 *
 * Multi-statement mutations run inside one `UnitOfWork`: the caller does its
 * work against `conn()` and hands the outcome to `finish`, which commits on
 * `Ok` and rolls back on `Err`.
 */

use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::errors::ServiceError;

pub struct UnitOfWork {
    txn: DatabaseTransaction,
    operation: &'static str,
    started: Instant,
}

impl UnitOfWork {
    pub async fn begin(
        db: &DatabaseConnection,
        operation: &'static str,
    ) -> Result<Self, ServiceError> {
        let txn = db.begin().await.map_err(|e| {
            error!(operation, error = %e, "Failed to begin transaction");
            ServiceError::DatabaseError(e)
        })?;
        counter!("storefront_db.transaction.started", 1, "operation" => operation);
        debug!(operation, "Transaction started");

        Ok(Self {
            txn,
            operation,
            started: Instant::now(),
        })
    }

    /// Connection every statement of this unit must run on.
    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits when `result` is `Ok`, otherwise rolls back and returns the original error.
    pub async fn finish<T>(self, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        let Self {
            txn,
            operation,
            started,
        } = self;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(|e| {
                    error!(operation, error = %e, "Failed to commit transaction");
                    counter!("storefront_db.transaction.commit_failed", 1, "operation" => operation);
                    ServiceError::DatabaseError(e)
                })?;
                let elapsed = started.elapsed();
                histogram!("storefront_db.transaction.duration", elapsed, "operation" => operation);
                counter!("storefront_db.transaction.committed", 1, "operation" => operation);
                debug!(operation, ?elapsed, "Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(operation, error = %rollback_err, "Failed to roll back transaction");
                }
                counter!("storefront_db.transaction.rolled_back", 1, "operation" => operation);
                warn!(operation, error = %err, "Transaction rolled back after {:?}", started.elapsed());
                Err(err)
            }
        }
    }
}

//! Per-user refund wallet backed by an append-only ledger.
//!
//! `credit_in` / `debit_in` run on a caller-supplied connection so refunds
//! can share the transaction of the order or return they settle. The cached
//! balance and the ledger row are always written together, and the balance
//! moves by an in-place increment so concurrent writers never overwrite each
//! other.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::UnitOfWork;
use crate::entities::wallet_transaction::{self, WalletTransactionType};
use crate::errors::{ServiceError, WalletError};
use crate::events::{Event, EventSender};
use crate::repositories::WalletRepository;

/// What a ledger row points back at, e.g. `("order", id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReference {
    pub kind: &'static str,
    pub id: Uuid,
}

impl LedgerReference {
    pub fn order(id: Uuid) -> Self {
        Self { kind: "order", id }
    }

    pub fn return_request(id: Uuid) -> Self {
        Self {
            kind: "return_request",
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletEntry {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub transaction: wallet_transaction::Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletBalance {
    pub user_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WalletAdjustmentInput {
    pub amount: Decimal,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct WalletService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl WalletService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds `amount` to the user's wallet, opening it if needed.
    pub async fn credit_in<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        amount: Decimal,
        kind: WalletTransactionType,
        reference: Option<LedgerReference>,
        description: Option<String>,
    ) -> Result<WalletEntry, ServiceError> {
        if amount <= Decimal::ZERO || !kind.is_credit() {
            return Err(WalletError::InvalidAmount.into());
        }
        let wallet = WalletRepository::find_or_create(conn, user_id).await?;
        let wallet = WalletRepository::adjust_balance(conn, wallet.id, amount)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("wallet for user {user_id}")))?;
        Self::record(conn, wallet, kind, amount, reference, description).await
    }

    pub async fn debit_in<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<LedgerReference>,
        description: Option<String>,
    ) -> Result<WalletEntry, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount.into());
        }
        let wallet = WalletRepository::find_or_create(conn, user_id).await?;
        let wallet = match WalletRepository::adjust_balance(conn, wallet.id, -amount).await? {
            Some(wallet) => wallet,
            None => {
                let available = WalletRepository::find_by_user(conn, user_id)
                    .await?
                    .map_or(Decimal::ZERO, |w| w.balance);
                return Err(WalletError::InsufficientBalance { available }.into());
            }
        };
        Self::record(
            conn,
            wallet,
            WalletTransactionType::Debit,
            amount,
            reference,
            description,
        )
        .await
    }

    /// Writes the ledger row for a balance change already applied to `wallet`.
    async fn record<C: ConnectionTrait>(
        conn: &C,
        wallet: crate::entities::wallet::Model,
        kind: WalletTransactionType,
        amount: Decimal,
        reference: Option<LedgerReference>,
        description: Option<String>,
    ) -> Result<WalletEntry, ServiceError> {
        let balance = wallet.balance;
        let transaction = WalletRepository::append_transaction(
            conn,
            wallet_transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                wallet_id: Set(wallet.id),
                user_id: Set(wallet.user_id),
                transaction_type: Set(kind),
                amount: Set(amount),
                balance_after: Set(balance),
                reference_id: Set(reference.map(|r| r.id)),
                reference_type: Set(reference.map(|r| r.kind.to_string())),
                description: Set(description),
                created_at: Set(Utc::now()),
            },
        )
        .await?;

        info!(
            user_id = %wallet.user_id,
            kind = %kind,
            %amount,
            balance = %balance,
            "wallet ledger entry recorded"
        );
        Ok(WalletEntry {
            user_id: wallet.user_id,
            balance,
            transaction,
        })
    }

    /// Manual credit by an operator
    #[instrument(skip(self, input))]
    pub async fn credit(
        &self,
        user_id: Uuid,
        input: WalletAdjustmentInput,
    ) -> Result<WalletEntry, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "wallet_credit").await?;
        let result = Self::credit_in(
            uow.conn(),
            user_id,
            input.amount,
            WalletTransactionType::Credit,
            None,
            input.description,
        )
        .await;
        let entry = uow.finish(result).await?;

        self.event_sender
            .send_or_log(Event::WalletCredited {
                user_id,
                amount: input.amount,
                balance: entry.balance,
            })
            .await;
        Ok(entry)
    }

    #[instrument(skip(self, input))]
    pub async fn debit(
        &self,
        user_id: Uuid,
        input: WalletAdjustmentInput,
    ) -> Result<WalletEntry, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "wallet_debit").await?;
        let result = Self::debit_in(uow.conn(), user_id, input.amount, None, input.description).await;
        let entry = uow.finish(result).await?;

        self.event_sender
            .send_or_log(Event::WalletDebited {
                user_id,
                amount: input.amount,
                balance: entry.balance,
            })
            .await;
        Ok(entry)
    }

    /// A user without a wallet has a zero balance.
    pub async fn get_balance(&self, user_id: Uuid) -> Result<WalletBalance, ServiceError> {
        let balance = WalletRepository::find_by_user(&*self.db, user_id)
            .await?
            .map_or(Decimal::ZERO, |w| w.balance);
        Ok(WalletBalance { user_id, balance })
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<wallet_transaction::Model>, u64), ServiceError> {
        match WalletRepository::find_by_user(&*self.db, user_id).await? {
            Some(wallet) => {
                WalletRepository::list_transactions(&*self.db, wallet.id, page, per_page).await
            }
            None => Ok((Vec::new(), 0)),
        }
    }
}

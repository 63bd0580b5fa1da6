use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::wallet::{self, Entity as Wallet};
use crate::entities::wallet_transaction::{self, Entity as WalletTransaction};
use crate::errors::ServiceError;

use super::page_index;

pub struct WalletRepository;

impl WalletRepository {
    pub async fn find_by_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<wallet::Model>, ServiceError> {
        Ok(Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(conn)
            .await?)
    }

    /// Wallets are opened lazily with a zero balance on first credit.
    pub async fn find_or_create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<wallet::Model, ServiceError> {
        if let Some(wallet) = Self::find_by_user(conn, user_id).await? {
            return Ok(wallet);
        }
        let now = Utc::now();
        let wallet = wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(wallet.insert(conn).await?)
    }

    /// Moves the balance by `delta` in one statement and returns the wallet
    /// as it stands afterwards. A debit that would take the balance below
    /// zero touches nothing and yields `None`.
    pub async fn adjust_balance<C: ConnectionTrait>(
        conn: &C,
        wallet_id: Uuid,
        delta: Decimal,
    ) -> Result<Option<wallet::Model>, ServiceError> {
        let mut update = Wallet::update_many()
            .col_expr(
                wallet::Column::Balance,
                Expr::col(wallet::Column::Balance).add(delta),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallet::Column::Id.eq(wallet_id));
        if delta < Decimal::ZERO {
            update = update.filter(wallet::Column::Balance.gte(-delta));
        }

        if update.exec(conn).await?.rows_affected != 1 {
            return Ok(None);
        }
        Ok(Wallet::find_by_id(wallet_id).one(conn).await?)
    }

    pub async fn append_transaction<C: ConnectionTrait>(
        conn: &C,
        entry: wallet_transaction::ActiveModel,
    ) -> Result<wallet_transaction::Model, ServiceError> {
        Ok(entry.insert(conn).await?)
    }

    /// Ledger rows oldest first, so running balances read top to bottom.
    pub async fn list_transactions<C: ConnectionTrait>(
        conn: &C,
        wallet_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<wallet_transaction::Model>, u64), ServiceError> {
        let paginator = WalletTransaction::find()
            .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
            .order_by_asc(wallet_transaction::Column::CreatedAt)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page_index(page)).await?;
        Ok((entries, total))
    }
}

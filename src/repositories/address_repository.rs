use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::commerce::shipping_address::{self, Entity as ShippingAddress};
use crate::entities::commerce::user_address::{self, Entity as UserAddress};
use crate::errors::ServiceError;

/// Address fields shared by the mutable address book and its snapshots
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

pub struct AddressRepository;

impl AddressRepository {
    pub async fn find_user_address<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<user_address::Model>, ServiceError> {
        Ok(UserAddress::find_by_id(id).one(conn).await?)
    }

    pub async fn list_user_addresses<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Vec<user_address::Model>, ServiceError> {
        Ok(UserAddress::find()
            .filter(user_address::Column::UserId.eq(user_id))
            .all(conn)
            .await?)
    }

    pub async fn create_user_address<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        fields: AddressFields,
    ) -> Result<user_address::Model, ServiceError> {
        let now = Utc::now();
        let model = user_address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            full_name: Set(fields.full_name),
            phone: Set(fields.phone),
            line1: Set(fields.line1),
            line2: Set(fields.line2),
            city: Set(fields.city),
            state: Set(fields.state),
            postal_code: Set(fields.postal_code),
            country: Set(fields.country),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(conn).await?)
    }

    pub async fn update_user_address<C: ConnectionTrait>(
        conn: &C,
        address: user_address::Model,
        fields: AddressFields,
    ) -> Result<user_address::Model, ServiceError> {
        let mut active: user_address::ActiveModel = address.into();
        active.full_name = Set(fields.full_name);
        active.phone = Set(fields.phone);
        active.line1 = Set(fields.line1);
        active.line2 = Set(fields.line2);
        active.city = Set(fields.city);
        active.state = Set(fields.state);
        active.postal_code = Set(fields.postal_code);
        active.country = Set(fields.country);
        active.updated_at = Set(Utc::now());
        Ok(active.update(conn).await?)
    }

    pub async fn find_shipping_address<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<shipping_address::Model>, ServiceError> {
        Ok(ShippingAddress::find_by_id(id).one(conn).await?)
    }

    /// Returns the snapshot of this exact revision of `address`, creating it on
    /// first use. A later edit bumps `updated_at` and so yields a new snapshot.
    pub async fn snapshot<C: ConnectionTrait>(
        conn: &C,
        address: &user_address::Model,
    ) -> Result<shipping_address::Model, ServiceError> {
        let existing = ShippingAddress::find()
            .filter(shipping_address::Column::SourceAddressId.eq(address.id))
            .filter(shipping_address::Column::SourceUpdatedAt.eq(address.updated_at))
            .one(conn)
            .await?;
        if let Some(snapshot) = existing {
            return Ok(snapshot);
        }

        let model = shipping_address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(address.user_id),
            source_address_id: Set(address.id),
            source_updated_at: Set(address.updated_at),
            full_name: Set(address.full_name.clone()),
            phone: Set(address.phone.clone()),
            line1: Set(address.line1.clone()),
            line2: Set(address.line2.clone()),
            city: Set(address.city.clone()),
            state: Set(address.state.clone()),
            postal_code: Set(address.postal_code.clone()),
            country: Set(address.country.clone()),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(conn).await?)
    }
}

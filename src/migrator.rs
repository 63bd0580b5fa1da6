use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_checkout_tables::Migration),
            Box::new(m20240301_000003_create_order_tables::Migration),
            Box::new(m20240301_000004_create_post_purchase_tables::Migration),
            Box::new(m20240301_000005_create_wallet_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Price).decimal_len(16, 4).not_null())
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::DeletedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserAddresses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserAddresses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(UserAddresses::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserAddresses::FullName).string().not_null())
                        .col(ColumnDef::new(UserAddresses::Phone).string().not_null())
                        .col(ColumnDef::new(UserAddresses::Line1).string().not_null())
                        .col(ColumnDef::new(UserAddresses::Line2).string().null())
                        .col(ColumnDef::new(UserAddresses::City).string().not_null())
                        .col(ColumnDef::new(UserAddresses::State).string().not_null())
                        .col(ColumnDef::new(UserAddresses::PostalCode).string().not_null())
                        .col(ColumnDef::new(UserAddresses::Country).string().not_null())
                        .col(ColumnDef::new(UserAddresses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(UserAddresses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_addresses_user_id")
                        .table(UserAddresses::Table)
                        .col(UserAddresses::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserAddresses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Price,
        StockQuantity,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum UserAddresses {
        Table,
        Id,
        UserId,
        FullName,
        Phone,
        Line1,
        Line2,
        City,
        State,
        PostalCode,
        Country,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_checkout_tables {
    use super::m20240301_000001_create_catalog_tables::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_checkout_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CartItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(CartItems::UserId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(CartItems::Price).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(CartItems::Subtotal).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(CartItems::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(CartItems::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_product_id")
                                .from(CartItems::Table, CartItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_items_user_product")
                        .table(CartItems::Table)
                        .col(CartItems::UserId)
                        .col(CartItems::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ShippingAddresses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ShippingAddresses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(ShippingAddresses::UserId).uuid().not_null())
                        .col(ColumnDef::new(ShippingAddresses::SourceAddressId).uuid().not_null())
                        .col(
                            ColumnDef::new(ShippingAddresses::SourceUpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShippingAddresses::FullName).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::Phone).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::Line1).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::Line2).string().null())
                        .col(ColumnDef::new(ShippingAddresses::City).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::State).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::PostalCode).string().not_null())
                        .col(ColumnDef::new(ShippingAddresses::Country).string().not_null())
                        .col(
                            ColumnDef::new(ShippingAddresses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipping_addresses_source")
                        .table(ShippingAddresses::Table)
                        .col(ShippingAddresses::SourceAddressId)
                        .col(ShippingAddresses::SourceUpdatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CheckoutSessions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CheckoutSessions::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(CheckoutSessions::UserId).uuid().not_null())
                        .col(ColumnDef::new(CheckoutSessions::TotalAmount).decimal_len(16, 4).not_null())
                        .col(
                            ColumnDef::new(CheckoutSessions::DiscountAmount)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CheckoutSessions::FinalAmount).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(CheckoutSessions::ItemCount).integer().not_null())
                        .col(ColumnDef::new(CheckoutSessions::CouponCode).string().null())
                        .col(
                            ColumnDef::new(CheckoutSessions::CouponApplied)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(CheckoutSessions::ShippingAddressId).uuid().null())
                        .col(ColumnDef::new(CheckoutSessions::Status).string_len(32).not_null())
                        .col(ColumnDef::new(CheckoutSessions::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(CheckoutSessions::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_checkout_sessions_shipping_address_id")
                                .from(CheckoutSessions::Table, CheckoutSessions::ShippingAddressId)
                                .to(ShippingAddresses::Table, ShippingAddresses::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_checkout_sessions_user_status")
                        .table(CheckoutSessions::Table)
                        .col(CheckoutSessions::UserId)
                        .col(CheckoutSessions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Coupons::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Coupons::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Coupons::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Coupons::DiscountPercentage).decimal_len(5, 2).not_null())
                        .col(
                            ColumnDef::new(Coupons::MinOrderAmount)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Coupons::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Coupons::ExpiresAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Coupons::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Coupons::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Coupons::Table.into_iden(),
                CheckoutSessions::Table.into_iden(),
                ShippingAddresses::Table.into_iden(),
                CartItems::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum CartItems {
        Table,
        Id,
        UserId,
        ProductId,
        Quantity,
        Price,
        Subtotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ShippingAddresses {
        Table,
        Id,
        UserId,
        SourceAddressId,
        SourceUpdatedAt,
        FullName,
        Phone,
        Line1,
        Line2,
        City,
        State,
        PostalCode,
        Country,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CheckoutSessions {
        Table,
        Id,
        UserId,
        TotalAmount,
        DiscountAmount,
        FinalAmount,
        ItemCount,
        CouponCode,
        CouponApplied,
        ShippingAddressId,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Coupons {
        Table,
        Id,
        Code,
        DiscountPercentage,
        MinOrderAmount,
        IsActive,
        ExpiresAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_order_tables {
    use super::m20240301_000001_create_catalog_tables::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::CheckoutSessionId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::TotalAmount).decimal_len(16, 4).not_null())
                        .col(
                            ColumnDef::new(Orders::DiscountAmount)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::FinalAmount).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(Orders::CouponCode).string().null())
                        .col(
                            ColumnDef::new(Orders::CouponApplied)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::OrderStatus).string_len(32).not_null())
                        .col(ColumnDef::new(Orders::DeliveryStatus).string_len(32).not_null())
                        .col(ColumnDef::new(Orders::RefundStatus).string_len(32).null())
                        .col(ColumnDef::new(Orders::PaymentMethod).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::ShippingAddressId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::HasReturnRequest)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Orders::IsCancelled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Orders::DeliveredAt).timestamp_with_time_zone().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_status")
                        .table(Orders::Table)
                        .col(Orders::OrderStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Price).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(OrderItems::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Payments::UserId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(Payments::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(Payments::PaymentMethod).string_len(16).not_null())
                        .col(ColumnDef::new(Payments::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Payments::GatewayOrderId).string().null())
                        .col(ColumnDef::new(Payments::GatewayPaymentId).string().null())
                        .col(ColumnDef::new(Payments::GatewaySignature).string().null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Payments::PaidAt).timestamp_with_time_zone().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payments_order_id")
                                .from(Payments::Table, Payments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_gateway_order_id")
                        .table(Payments::Table)
                        .col(Payments::GatewayOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Payments::Table.into_iden(),
                OrderItems::Table.into_iden(),
                Orders::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        UserId,
        CheckoutSessionId,
        TotalAmount,
        DiscountAmount,
        FinalAmount,
        CouponCode,
        CouponApplied,
        OrderStatus,
        DeliveryStatus,
        RefundStatus,
        PaymentMethod,
        ShippingAddressId,
        HasReturnRequest,
        IsCancelled,
        CreatedAt,
        UpdatedAt,
        DeliveredAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        Price,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        OrderId,
        UserId,
        Amount,
        Currency,
        PaymentMethod,
        Status,
        GatewayOrderId,
        GatewayPaymentId,
        GatewaySignature,
        CreatedAt,
        UpdatedAt,
        PaidAt,
    }
}

mod m20240301_000004_create_post_purchase_tables {
    use super::m20240301_000003_create_order_tables::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_post_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CancellationRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CancellationRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CancellationRequests::OrderId).uuid().not_null())
                        .col(ColumnDef::new(CancellationRequests::UserId).uuid().not_null())
                        .col(ColumnDef::new(CancellationRequests::Reason).string().null())
                        .col(ColumnDef::new(CancellationRequests::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(CancellationRequests::PreviousStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CancellationRequests::IsStockUpdated)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CancellationRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CancellationRequests::ReviewedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cancellation_requests_order_id")
                                .from(CancellationRequests::Table, CancellationRequests::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cancellation_requests_order_status")
                        .table(CancellationRequests::Table)
                        .col(CancellationRequests::OrderId)
                        .col(CancellationRequests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReturnRequests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ReturnRequests::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(ReturnRequests::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ReturnRequests::UserId).uuid().not_null())
                        .col(ColumnDef::new(ReturnRequests::Reason).string().not_null())
                        .col(
                            ColumnDef::new(ReturnRequests::RequestedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReturnRequests::ApprovedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(ReturnRequests::RejectedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(ReturnRequests::RefundInitiated)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ReturnRequests::RefundAmount).decimal_len(16, 4).null())
                        .col(
                            ColumnDef::new(ReturnRequests::RefundCompleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ReturnRequests::IsOrderReachedSeller)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ReturnRequests::ReturnedToSellerAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReturnRequests::IsStockUpdated)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ReturnRequests::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_return_requests_order_id")
                                .from(ReturnRequests::Table, ReturnRequests::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_return_requests_user_id")
                        .table(ReturnRequests::Table)
                        .col(ReturnRequests::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReturnRequests::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CancellationRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CancellationRequests {
        Table,
        Id,
        OrderId,
        UserId,
        Reason,
        Status,
        PreviousStatus,
        IsStockUpdated,
        CreatedAt,
        ReviewedAt,
    }

    #[derive(DeriveIden)]
    enum ReturnRequests {
        Table,
        Id,
        OrderId,
        UserId,
        Reason,
        RequestedDate,
        ApprovedAt,
        RejectedAt,
        RefundInitiated,
        RefundAmount,
        RefundCompleted,
        IsOrderReachedSeller,
        ReturnedToSellerAt,
        IsStockUpdated,
        UpdatedAt,
    }
}

mod m20240301_000005_create_wallet_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_wallet_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Wallets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Wallets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Wallets::UserId).uuid().not_null().unique_key())
                        .col(
                            ColumnDef::new(Wallets::Balance)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Wallets::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Wallets::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WalletTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WalletTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WalletTransactions::WalletId).uuid().not_null())
                        .col(ColumnDef::new(WalletTransactions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(WalletTransactions::TransactionType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(WalletTransactions::Amount).decimal_len(16, 4).not_null())
                        .col(
                            ColumnDef::new(WalletTransactions::BalanceAfter)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(WalletTransactions::ReferenceId).uuid().null())
                        .col(ColumnDef::new(WalletTransactions::ReferenceType).string().null())
                        .col(ColumnDef::new(WalletTransactions::Description).string().null())
                        .col(
                            ColumnDef::new(WalletTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_wallet_transactions_wallet_id")
                                .from(WalletTransactions::Table, WalletTransactions::WalletId)
                                .to(Wallets::Table, Wallets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_wallet_transactions_wallet_id")
                        .table(WalletTransactions::Table)
                        .col(WalletTransactions::WalletId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WalletTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Wallets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Wallets {
        Table,
        Id,
        UserId,
        Balance,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum WalletTransactions {
        Table,
        Id,
        WalletId,
        UserId,
        TransactionType,
        Amount,
        BalanceAfter,
        ReferenceId,
        ReferenceType,
        Description,
        CreatedAt,
    }
}

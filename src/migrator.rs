use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_tables::Migration),
            Box::new(m20240601_000002_create_purchase_order_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Supplier::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Supplier::SupplierId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Supplier::SupplierName).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Item::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Item::ItemId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Item::ItemNameEnglish).string().not_null())
                        .col(ColumnDef::new(Item::ItemPicture).binary().null())
                        .col(ColumnDef::new(Item::AverageRequired).integer().null())
                        .col(ColumnDef::new(Item::ClassCat).string().null())
                        .col(ColumnDef::new(Item::DepartmentCat).string().null())
                        .col(ColumnDef::new(Item::SectionCat).string().null())
                        .col(ColumnDef::new(Item::FamilyCat).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ItemSupplier::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ItemSupplier::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(ItemSupplier::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(ItemSupplier::ItemId)
                                .col(ItemSupplier::SupplierId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_itemsupplier_itemid")
                                .from(ItemSupplier::Table, ItemSupplier::ItemId)
                                .to(Item::Table, Item::ItemId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_itemsupplier_supplierid")
                                .from(ItemSupplier::Table, ItemSupplier::SupplierId)
                                .to(Supplier::Table, Supplier::SupplierId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemSupplier::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Item::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Supplier::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Supplier {
        #[sea_orm(iden = "supplier")]
        Table,
        #[sea_orm(iden = "supplierid")]
        SupplierId,
        #[sea_orm(iden = "suppliername")]
        SupplierName,
    }

    #[derive(DeriveIden)]
    pub(super) enum Item {
        #[sea_orm(iden = "item")]
        Table,
        #[sea_orm(iden = "itemid")]
        ItemId,
        #[sea_orm(iden = "itemnameenglish")]
        ItemNameEnglish,
        #[sea_orm(iden = "itempicture")]
        ItemPicture,
        #[sea_orm(iden = "averagerequired")]
        AverageRequired,
        #[sea_orm(iden = "classcat")]
        ClassCat,
        #[sea_orm(iden = "departmentcat")]
        DepartmentCat,
        #[sea_orm(iden = "sectioncat")]
        SectionCat,
        #[sea_orm(iden = "familycat")]
        FamilyCat,
    }

    #[derive(DeriveIden)]
    enum ItemSupplier {
        #[sea_orm(iden = "itemsupplier")]
        Table,
        #[sea_orm(iden = "itemid")]
        ItemId,
        #[sea_orm(iden = "supplierid")]
        SupplierId,
    }
}

mod m20240601_000002_create_purchase_order_tables {
    use super::m20240601_000001_create_catalog_tables::{Item, Supplier};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::PoId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ExpectedDelivery)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null()
                                .default("Pending"),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::RespondedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ActualDelivery)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::SupProposedDeliver)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::SupplierNote).text().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::OriginalPoId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Approval)
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchaseorders_supplierid")
                                .from(PurchaseOrders::Table, PurchaseOrders::SupplierId)
                                .to(Supplier::Table, Supplier::SupplierId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchaseorders_originalpoid")
                                .from(PurchaseOrders::Table, PurchaseOrders::OriginalPoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::PoId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchaseorders_status_orderdate")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Status)
                        .col(PurchaseOrders::OrderDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchaseorders_originalpoid")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::OriginalPoId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::PoItemId)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::PoId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::OrderedQuantity)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::EstimatedPrice)
                                .decimal_len(15, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::ReceivedQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::SupProposedQuantity)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::SupProposedPrice)
                                .decimal_len(15, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Approval)
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchaseorderitems_poid")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::PoId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchaseorderitems_itemid")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::ItemId)
                                .to(Item::Table, Item::ItemId),
                        )
                        .to_owned(),
                )
                .await?;

            // One line per item per order; point updates are keyed on it
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchaseorderitems_poid_itemid")
                        .table(PurchaseOrderItems::Table)
                        .col(PurchaseOrderItems::PoId)
                        .col(PurchaseOrderItems::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        #[sea_orm(iden = "purchaseorders")]
        Table,
        #[sea_orm(iden = "poid")]
        PoId,
        #[sea_orm(iden = "supplierid")]
        SupplierId,
        #[sea_orm(iden = "orderdate")]
        OrderDate,
        #[sea_orm(iden = "expecteddelivery")]
        ExpectedDelivery,
        #[sea_orm(iden = "status")]
        Status,
        #[sea_orm(iden = "respondedat")]
        RespondedAt,
        #[sea_orm(iden = "actualdelivery")]
        ActualDelivery,
        #[sea_orm(iden = "createdby")]
        CreatedBy,
        #[sea_orm(iden = "supproposeddeliver")]
        SupProposedDeliver,
        #[sea_orm(iden = "suppliernote")]
        SupplierNote,
        #[sea_orm(iden = "originalpoid")]
        OriginalPoId,
        #[sea_orm(iden = "approval")]
        Approval,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderItems {
        #[sea_orm(iden = "purchaseorderitems")]
        Table,
        #[sea_orm(iden = "poitemid")]
        PoItemId,
        #[sea_orm(iden = "poid")]
        PoId,
        #[sea_orm(iden = "itemid")]
        ItemId,
        #[sea_orm(iden = "orderedquantity")]
        OrderedQuantity,
        #[sea_orm(iden = "estimatedprice")]
        EstimatedPrice,
        #[sea_orm(iden = "receivedquantity")]
        ReceivedQuantity,
        #[sea_orm(iden = "supproposedquantity")]
        SupProposedQuantity,
        #[sea_orm(iden = "supproposedprice")]
        SupProposedPrice,
        #[sea_orm(iden = "approval")]
        Approval,
    }
}

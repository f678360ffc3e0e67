use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CouponPolicies::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CouponPolicies::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(CouponPolicies::Name).string_len(50).not_null())
          .col(
            ColumnDef::new(CouponPolicies::MinPurchaseAmount)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(CouponPolicies::DiscountType)
              .string_len(20)
              .not_null(),
          )
          .col(
            ColumnDef::new(CouponPolicies::DiscountValue)
              .integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CouponPolicies::MaxDiscountAmount).integer().null(),
          )
          .col(ColumnDef::new(CouponPolicies::EventType).string_len(20).null())
          .col(
            ColumnDef::new(CouponPolicies::IsDeleted)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(CouponPolicies::CreatedAt).date_time().not_null(),
          )
          .to_owned(),
      )
      .await?;

    // Event lookups always filter on live rows
    manager
      .create_index(
        Index::create()
          .name("idx_coupon_policies_event_type")
          .table(CouponPolicies::Table)
          .col(CouponPolicies::EventType)
          .col(CouponPolicies::IsDeleted)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CouponPolicies::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum CouponPolicies {
  Table,
  Id,
  Name,
  MinPurchaseAmount,
  DiscountType,
  DiscountValue,
  MaxDiscountAmount,
  EventType,
  IsDeleted,
  CreatedAt,
}

use sea_orm_migration::prelude::*;

use super::m20261018_000001_create_coupon_policies::CouponPolicies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Coupons::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Coupons::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Coupons::PolicyId).big_integer().not_null())
          .col(ColumnDef::new(Coupons::Name).string_len(50).not_null())
          .col(ColumnDef::new(Coupons::Target).string_len(20).not_null())
          .col(ColumnDef::new(Coupons::TargetId).big_integer().null())
          .col(ColumnDef::new(Coupons::Deadline).date_time().not_null())
          .col(ColumnDef::new(Coupons::CreatedAt).date_time().not_null())
          .col(
            ColumnDef::new(Coupons::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Coupons::UsedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_coupons_policy")
              .from(Coupons::Table, Coupons::PolicyId)
              .to(CouponPolicies::Table, CouponPolicies::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_coupons_is_active")
          .table(Coupons::Table)
          .col(Coupons::IsActive)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Coupons::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
enum Coupons {
  Table,
  Id,
  PolicyId,
  Name,
  Target,
  TargetId,
  Deadline,
  CreatedAt,
  IsActive,
  UsedAt,
}

use sea_orm_migration::prelude::*;

/// Winners (中奖记录表)
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    UsersId,
    EventId,
    DeclaredBy,
    CreatedAt,
    IsActive,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Winners::UsersId).big_integer().not_null())
                    .col(ColumnDef::new(Winners::EventId).big_integer().not_null())
                    .col(ColumnDef::new(Winners::DeclaredBy).string().not_null())
                    .col(
                        ColumnDef::new(Winners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Winners::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 每场活动最多一名已提交的中奖者 (提交事务内还会再做一次存在性检查)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_event_unique")
                    .table(Winners::Table)
                    .col(Winners::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Winners::Table).to_owned())
            .await
    }
}

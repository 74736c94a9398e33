use sea_orm_migration::prelude::*;

/// Flow Sessions (注册/支付流程会话表)
/// data 列保存序列化后的流程状态: 支付尝试计数 + 待定注册资料
#[derive(DeriveIden)]
enum FlowSessions {
    Table,
    Id,
    Data,
    ExpiryDate,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FlowSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FlowSessions::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FlowSessions::Data).json().not_null())
                    .col(
                        ColumnDef::new(FlowSessions::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 过期清理按 expiry_date 扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_flow_sessions_expiry")
                    .table(FlowSessions::Table)
                    .col(FlowSessions::ExpiryDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FlowSessions::Table).to_owned())
            .await
    }
}

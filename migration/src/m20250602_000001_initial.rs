use sea_orm_migration::prelude::*;

/// Lottery Users (抽奖参与用户资料表)
/// auth_user_id 指向外部身份提供方的主体ID, 可为空:
/// 注册流程在支付成功前不创建身份主体
#[derive(DeriveIden)]
enum LotteryUsers {
    Table,
    Id,
    AuthUserId,
    Email,
    UserName,
    FirstName,
    MiddleName,
    LastName,
    Country,
    StreetLine1,
    StreetLine2,
    City,
    State,
    ZipPostal,
    Mobile,
    Home,
    CreatedBy,
    CreatedAt,
    IsActive,
}

/// Lottery Events (抽奖活动主表)
#[derive(DeriveIden)]
enum LotteryEvents {
    Table,
    Id,
    EventName,
    AmountCents,
    EventDate,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
}

/// Payments (支付流水表, 只追加不修改)
#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    UsersId,
    EventId,
    PaymentStatus,
    TransactionRef,
    AmountCents,
    CreatedBy,
    CreatedAt,
    IsActive,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表
        manager
            .create_table(
                Table::create()
                    .table(LotteryUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LotteryUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LotteryUsers::AuthUserId).string())
                    .col(ColumnDef::new(LotteryUsers::Email).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::UserName).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::FirstName).string().not_null())
                    .col(
                        ColumnDef::new(LotteryUsers::MiddleName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(LotteryUsers::LastName).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::Country).string().not_null())
                    .col(
                        ColumnDef::new(LotteryUsers::StreetLine1)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LotteryUsers::StreetLine2)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(LotteryUsers::City).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::State).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::ZipPostal).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::Mobile).string().not_null())
                    .col(ColumnDef::new(LotteryUsers::Home).string())
                    .col(ColumnDef::new(LotteryUsers::CreatedBy).string())
                    .col(
                        ColumnDef::new(LotteryUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(LotteryUsers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 邮箱唯一索引 (小写存储, 跨身份系统唯一性在服务层再校验一次)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lottery_users_email_unique")
                    .table(LotteryUsers::Table)
                    .col(LotteryUsers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // auth_user_id 查询索引 (登录闸门按主体ID查用户)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lottery_users_auth_user_id")
                    .table(LotteryUsers::Table)
                    .col(LotteryUsers::AuthUserId)
                    .to_owned(),
            )
            .await?;

        // 活动表
        manager
            .create_table(
                Table::create()
                    .table(LotteryEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LotteryEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LotteryEvents::EventName).string().not_null())
                    .col(
                        ColumnDef::new(LotteryEvents::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LotteryEvents::EventDate).date().not_null())
                    .col(
                        ColumnDef::new(LotteryEvents::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LotteryEvents::CreatedBy).string())
                    .col(
                        ColumnDef::new(LotteryEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(ColumnDef::new(LotteryEvents::UpdatedBy).string())
                    .col(
                        ColumnDef::new(LotteryEvents::UpdatedAt)
                            .timestamp_with_time_zone(),
                    )
                    .to_owned(),
            )
            .await?;

        // 支付流水表
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::UsersId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::EventId).big_integer())
                    .col(ColumnDef::new(Payments::PaymentStatus).string().not_null())
                    .col(
                        ColumnDef::new(Payments::TransactionRef)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::AmountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Payments::CreatedBy).string())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Payments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 最近一条记录按 (users_id, event_id, created_at) 倒序读取
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_user_event_created")
                    .table(Payments::Table)
                    .col(Payments::UsersId)
                    .col(Payments::EventId)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LotteryEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LotteryUsers::Table).to_owned())
            .await?;
        Ok(())
    }
}

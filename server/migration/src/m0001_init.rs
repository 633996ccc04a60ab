use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;
        // login_tokens
        manager
            .create_table(
                Table::create()
                    .table(LoginTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginTokens::TokenHash)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoginTokens::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LoginTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoginTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_tokens_user")
                            .from(LoginTokens::Table, LoginTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // account_confirmations
        manager
            .create_table(
                Table::create()
                    .table(AccountConfirmations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountConfirmations::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountConfirmations::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountConfirmations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountConfirmations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_confirmations_user")
                            .from(AccountConfirmations::Table, AccountConfirmations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // account_recoveries
        manager
            .create_table(
                Table::create()
                    .table(AccountRecoveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountRecoveries::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountRecoveries::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AccountRecoveries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountRecoveries::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountRecoveries::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_recoveries_user")
                            .from(AccountRecoveries::Table, AccountRecoveries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // leaderboards
        manager
            .create_table(
                Table::create()
                    .table(Leaderboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leaderboards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leaderboards::Name).string().not_null())
                    .col(ColumnDef::new(Leaderboards::Slug).string().not_null())
                    .col(
                        ColumnDef::new(Leaderboards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_leaderboards_slug")
                    .table(Leaderboards::Table)
                    .col(Leaderboards::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        // categories
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::LeaderboardId).uuid().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Slug).string().not_null())
                    .col(ColumnDef::new(Categories::RunType).string().not_null())
                    .col(ColumnDef::new(Categories::SortDirection).string().not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_leaderboard")
                            .from(Categories::Table, Categories::LeaderboardId)
                            .to(Leaderboards::Table, Leaderboards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_categories_leaderboard_slug")
                    .table(Categories::Table)
                    .col(Categories::LeaderboardId)
                    .col(Categories::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        // runs
        manager
            .create_table(
                Table::create()
                    .table(Runs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Runs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Runs::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Runs::UserId).uuid().not_null())
                    .col(ColumnDef::new(Runs::Info).string().not_null())
                    .col(ColumnDef::new(Runs::PlayedOn).date().not_null())
                    .col(ColumnDef::new(Runs::TimeOrScore).big_integer().not_null())
                    .col(
                        ColumnDef::new(Runs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Runs::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_runs_category")
                            .from(Runs::Table, Runs::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_runs_user")
                            .from(Runs::Table, Runs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_runs_category_played_on")
                    .table(Runs::Table)
                    .col(Runs::CategoryId)
                    .col(Runs::PlayedOn)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Runs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leaderboards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountRecoveries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountConfirmations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoginTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users { Table, Id, Email, PasswordHash, Role, CreatedAt }

#[derive(Iden)]
enum LoginTokens { Table, TokenHash, UserId, CreatedAt, ExpiresAt }

#[derive(Iden)]
enum AccountConfirmations { Table, Code, UserId, CreatedAt, ExpiresAt }

#[derive(Iden)]
enum AccountRecoveries { Table, Code, UserId, CreatedAt, ExpiresAt, UsedAt }

#[derive(Iden)]
enum Leaderboards { Table, Id, Name, Slug, CreatedAt }

#[derive(Iden)]
enum Categories { Table, Id, LeaderboardId, Name, Slug, RunType, SortDirection, CreatedAt, DeletedAt }

#[derive(Iden)]
enum Runs { Table, Id, CategoryId, UserId, Info, PlayedOn, TimeOrScore, CreatedAt, DeletedAt }

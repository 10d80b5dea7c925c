//! Create follower table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follower::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Follower::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Follower::WhoId).big_integer().not_null())
                    .col(ColumnDef::new(Follower::WhomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Follower::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follower_who")
                            .from(Follower::Table, Follower::WhoId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follower_whom")
                            .from(Follower::Table, Follower::WhomId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // No unique index over (who_id, whom_id): duplicate edges between
        // the same pair are allowed and removed one at a time.

        // Index: who_id (for listing following)
        manager
            .create_index(
                Index::create()
                    .name("idx_follower_who_id")
                    .table(Follower::Table)
                    .col(Follower::WhoId)
                    .to_owned(),
            )
            .await?;

        // Index: whom_id (for listing followers)
        manager
            .create_index(
                Index::create()
                    .name("idx_follower_whom_id")
                    .table(Follower::Table)
                    .col(Follower::WhomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follower::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follower {
    Table,
    Id,
    WhoId,
    WhomId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

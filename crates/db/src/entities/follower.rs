//! Follower entity (directed follow edges between users).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follower")]
pub struct Model {
    /// Edge ID. Duplicate (who, whom) pairs may coexist, each edge with
    /// its own ID; removal always targets a single edge by this key.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who is following
    pub who_id: i64,

    /// The user being followed
    pub whom_id: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WhoId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Who,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WhomId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Whom,
}

impl ActiveModelBehavior for ActiveModel {}

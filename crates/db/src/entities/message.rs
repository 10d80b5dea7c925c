//! Message entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    /// Message ID. The sequence is monotonic per insertion order and
    /// serves as the tie-break key for feed pagination.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: i64,

    /// Message text content
    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Publish timestamp, assigned at creation
    pub published_at: DateTimeWithTimeZone,

    /// Hidden from default feeds when set (moderation state)
    #[sea_orm(default_value = false)]
    pub flagged: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

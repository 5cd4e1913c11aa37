//! Post entity for SeaORM.

use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::entity::prelude::*;

use quill_core::domain::{NewPost, Post, PostChanges};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            content: model.content,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn for_user(user_id: i32, post: NewPost) -> Self {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        Self {
            id: NotSet,
            user_id: Set(user_id),
            title: Set(post.title),
            content: Set(post.content),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn changes(id: i32, changes: PostChanges) -> Self {
        Self {
            id: Unchanged(id),
            user_id: NotSet,
            title: changes.title.map_or(NotSet, Set),
            content: changes.content.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(chrono::Utc::now().into()),
        }
    }
}

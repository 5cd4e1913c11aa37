//! User entity for SeaORM.

use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::entity::prelude::*;

use quill_core::domain::{NewUserRecord, User, UserRecordChanges};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password,
            created_at: model.created_at.into(),
        }
    }
}

/// New rows get their id from the database.
impl From<NewUserRecord> for ActiveModel {
    fn from(user: NewUserRecord) -> Self {
        Self {
            id: NotSet,
            username: Set(user.username),
            email: Set(user.email),
            password: Set(user.password.into_string()),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}

impl ActiveModel {
    /// Partial update of row `id`; absent fields stay untouched.
    pub fn changes(id: i32, changes: UserRecordChanges) -> Self {
        Self {
            id: Unchanged(id),
            username: changes.username.map_or(NotSet, Set),
            email: changes.email.map_or(NotSet, Set),
            password: changes
                .password
                .map_or(NotSet, |hash| Set(hash.into_string())),
            created_at: NotSet,
        }
    }
}

//! Session entity for SeaORM.

use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Session;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sid: String,
    pub user_id: i32,
    pub username: String,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
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

impl From<Model> for Session {
    fn from(model: Model) -> Self {
        Self {
            sid: model.sid,
            user_id: model.user_id,
            username: model.username,
            expires_at: model.expires_at.into(),
            created_at: model.created_at.into(),
        }
    }
}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            sid: Set(session.sid.clone()),
            user_id: Set(session.user_id),
            username: Set(session.username.clone()),
            expires_at: Set(session.expires_at.into()),
            created_at: Set(session.created_at.into()),
        }
    }
}

//! Profile entity for SeaORM - one row per user, carries the subscription
//! state.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Profile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub is_subscribed: bool,
    pub subscription_end_date: Option<Date>,
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

impl From<Model> for Profile {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            bio: model.bio,
            is_subscribed: model.is_subscribed,
            subscription_end_date: model.subscription_end_date,
        }
    }
}

impl From<Profile> for ActiveModel {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: Set(profile.user_id),
            bio: Set(profile.bio),
            is_subscribed: Set(profile.is_subscribed),
            subscription_end_date: Set(profile.subscription_end_date),
        }
    }
}

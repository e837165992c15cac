use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: i32,
    pub start_time: Time,
    pub end_time: Time,
    pub room: String,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
    pub description: String,

    #[sea_orm(has_many)]
    pub schedules: HasMany<super::schedule::Entity>,

    #[sea_orm(has_many, via = "enrollment")]
    pub students: HasMany<super::student::Entity>,

    #[sea_orm(has_many)]
    pub grade_configurations: HasMany<super::grade_configuration::Entity>,

    #[sea_orm(has_many)]
    pub quizzes: HasMany<super::quiz::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub quiz_id: i32,
    #[sea_orm(primary_key)]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "quiz_id", to = "id")]
    pub quiz: BelongsTo<super::quiz::Entity>,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: BelongsTo<super::student::Entity>,

    pub total_grade: f64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

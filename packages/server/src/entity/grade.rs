use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single reporting or recitation graded event for one student.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    /// One of: reporting, recitation.
    pub component: String,
    pub total: f64,
    pub date: Date,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One attendance mark per student, course, and date.
///
/// The composite primary key makes batch saves upsert-atomic: two concurrent
/// submissions for the same (course, student, date) cannot create duplicates.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub course_id: i32,
    #[sea_orm(primary_key)]
    pub student_id: i32,
    #[sea_orm(primary_key)]
    pub date: Date,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: BelongsTo<super::course::Entity>,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: BelongsTo<super::student::Entity>,

    /// One of: present, late, absent, excused.
    pub status: String,

    pub recorded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

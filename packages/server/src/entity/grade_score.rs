use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A persisted snapshot of a computed composite score.
///
/// The referenced grade configuration pins the weights and threshold the
/// snapshot was computed under, so later configuration changes cannot
/// silently invalidate it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub grade_configuration_id: i32,
    #[sea_orm(belongs_to, from = "grade_configuration_id", to = "id")]
    pub grade_configuration: HasOne<super::grade_configuration::Entity>,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    pub reporting_score: f64,
    pub recitation_score: f64,
    pub quiz_score: f64,
    pub total_score: f64,
    /// One of: PASSED, FAILED, NO GRADE.
    pub remarks: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

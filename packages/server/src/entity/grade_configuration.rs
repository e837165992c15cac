use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-course grading weights and passing threshold for one grading period.
///
/// Several configurations may exist for a course; the most recently created
/// one is authoritative. Persisted score snapshots pin the configuration they
/// were computed under via `grade_score.grade_configuration_id`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade_configuration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub reporting_weight: f64,
    pub recitation_weight: f64,
    pub quiz_weight: f64,
    pub passing_threshold: f64,

    pub start_date: Date,
    pub end_date: Date,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::grade_score::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

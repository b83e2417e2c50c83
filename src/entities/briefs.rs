use super::types::{BriefStatus, FileList, TagSnapshots};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "briefs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub brand_id: String,
    pub created_by: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub is_paid: bool,
    pub prize_amount: Option<f64>,
    pub submission_deadline: Option<DateTimeUtc>,
    pub voting_start: Option<DateTimeUtc>,
    pub voting_end: Option<DateTimeUtc>,
    pub status: BriefStatus,
    #[sea_orm(column_type = "Json")]
    pub tags: TagSnapshots,
    #[sea_orm(column_type = "Json")]
    pub files: FileList,
    pub submission_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brands::Entity",
        from = "Column::BrandId",
        to = "super::brands::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Brands,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::brands::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brands.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Father / mother / caregiver rows of a household (form columns C26-C34).
///
/// `role` is stored as a plain string and validated at the API boundary.
/// The model itself does not enforce at-most-one-per-role; the summary
/// service counts whatever rows exist and skips unrecognized roles.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "household_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub household_id: Uuid,
    pub name: Option<String>,
    /// father | mother | caregiver
    pub role: String,
    /// Occupation code "1".."11" (11 = None)
    pub occupation: Option<String>,
    /// N, EU, EG, HU, HG, CU, CG, V, PG
    pub educational_attainment: Option<String>,
    pub practicing_family_planning: bool,
    pub created_at: Option<ChronoDateTimeUtc>,
    pub updated_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::household::Entity",
        from = "Column::HouseholdId",
        to = "super::household::Column::Id",
        on_delete = "Cascade"
    )]
    Household,
}

impl Related<super::household::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Household.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One surveyed dwelling unit (BNS Form No. 1A, columns C1-C25 plus the
/// household practices block). Classification codes are stored as the raw
/// form codes; the summary service owns their interpretation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "households")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // Location (form header)
    pub purok_sito: Option<String>,
    pub barangay: Option<String>,
    pub municipality_city: Option<String>,
    pub province: Option<String>,

    // Household identification
    pub household_number: String,
    pub family_living_in_house: i32,
    pub number_of_members: i32,
    /// 1-NHTS 4Ps, 2-NHTS Non-4Ps, 3-Non-NHTS
    pub nhts_household_group: Option<String>,
    /// 1-IP, 2-Non-IP
    pub indigenous_group: Option<String>,

    // Family members by age classification (male/female counts)
    pub newborn_male: i32,
    pub newborn_female: i32,
    pub infant_male: i32,
    pub infant_female: i32,
    pub under_five_male: i32,
    pub under_five_female: i32,
    pub children_male: i32,
    pub children_female: i32,
    pub adolescence_male: i32,
    pub adolescence_female: i32,
    pub adult_male: i32,
    pub adult_female: i32,
    pub senior_citizen_male: i32,
    pub senior_citizen_female: i32,
    pub pwd_male: i32,
    pub pwd_female: i32,

    // Health risk groups (female only)
    pub pregnant: i32,
    pub adolescent_pregnant: i32,
    pub post_partum: i32,
    pub women_15_49_not_pregnant: i32,

    // Facilities: 1-Improved, 2-Shared, 3-Unimproved, 4-Open defecation
    pub toilet_type: Option<i32>,
    /// 1-Improved, 2-Unimproved
    pub water_source: Option<i32>,
    /// VG, FT, PL, FP, NA
    pub food_production_activity: Option<String>,

    // Household practices
    pub couple_practicing_family_planning: Option<bool>,
    pub using_iodized_salt: bool,
    pub using_iron_fortified_rice: bool,

    pub created_at: Option<ChronoDateTimeUtc>,
    pub updated_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::household_member::Entity")]
    HouseholdMembers,
}

impl Related<super::household_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HouseholdMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

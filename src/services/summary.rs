//! Family Profile Survey Summary: filter and aggregation over households.
//!
//! Both functions are pure and synchronous. The caller fetches the full
//! household snapshot from the database, narrows it with [`apply_filters`],
//! and reduces the result with [`aggregate_summary`]. Nothing here touches
//! the database or the clock; presentation labels in [`BasicInfo`] are
//! filled in by the caller.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{household, household_member};
use crate::services::codes::{
    self, FoodProduction, ToiletType, WaterSource,
};

/// A household record together with its father/mother/caregiver rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseholdWithMembers {
    #[serde(flatten)]
    pub household: household::Model,
    pub members: Vec<household_member::Model>,
}

/// Report criteria. Empty fields impose no constraint; supplied fields are
/// ANDed together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryFilters {
    pub bns: String,
    pub barangay: String,
    pub purok_block_street: String,
    pub survey_year: String,
    pub survey_period_from: String,
    pub survey_period_to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub bns: String,
    pub barangay: String,
    pub purok_block_street: String,
    pub survey_period: String,
    pub survey_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub households: i32,
    pub families: i32,
    /// Count of distinct non-empty (trimmed) purok/block/street values.
    pub purok_block_street: i32,
    pub population: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FamilySize {
    #[serde(rename = "moreThan10")]
    pub more_than_10: i32,
    #[serde(rename = "n8to10")]
    pub n8_to_10: i32,
    #[serde(rename = "n6to7")]
    pub n6_to_7: i32,
    #[serde(rename = "n2to5")]
    pub n2_to_5: i32,
    #[serde(rename = "n1")]
    pub n1: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeHealth {
    pub newborn: i32,
    pub infants: i32,
    pub under_five: i32,
    #[serde(rename = "children5_9")]
    pub children_5_9: i32,
    pub adolescence: i32,
    pub adult: i32,
    pub pregnant: i32,
    pub adolescent_pregnant: i32,
    pub post_partum: i32,
    #[serde(rename = "women15_49")]
    pub women_15_49: i32,
    pub senior_citizens: i32,
    pub pwd: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Practices {
    #[serde(rename = "coupleFP")]
    pub couple_fp: i32,
    pub toilet_improved: i32,
    pub toilet_shared: i32,
    pub toilet_unimproved: i32,
    pub toilet_open: i32,
    pub water_improved: i32,
    pub water_unimproved: i32,
    #[serde(rename = "foodVG")]
    pub food_vg: i32,
    pub food_fruit: i32,
    #[serde(rename = "foodPL")]
    pub food_pl: i32,
    #[serde(rename = "foodFP")]
    pub food_fp: i32,
    pub food_none: i32,
    pub iodized_salt: i32,
    pub iron_fortified_rice: i32,
}

/// The fixed-shape aggregation result. Recomputed on every request, never
/// persisted. Occupation arrays are index-aligned with
/// [`codes::OCC_LABELS`], education arrays with [`codes::ED_LABELS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub basic: BasicInfo,
    pub totals: Totals,
    pub family_size: FamilySize,
    pub age_health: AgeHealth,
    pub father_occ: [i32; 11],
    pub father_ed: [i32; 9],
    pub mother_occ: [i32; 11],
    pub mother_ed: [i32; 9],
    pub caregiver_occ: [i32; 11],
    pub caregiver_ed: [i32; 9],
    pub practices: Practices,
}

/// The record's survey-date proxy. There is no dedicated survey-date field
/// on the form, so the last-touched timestamp stands in for it; both the
/// year filter and the period filter must go through this same selection.
fn survey_date(h: &household::Model) -> Option<DateTime<Utc>> {
    h.updated_at.or(h.created_at)
}

fn period_bound(value: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
}

/// Select the households matching every supplied criterion. Stable: output
/// preserves input order. Households without any timestamp are never
/// excluded by the year or period criteria.
pub fn apply_filters<'a>(
    households: &'a [HouseholdWithMembers],
    filters: &SummaryFilters,
) -> Vec<&'a HouseholdWithMembers> {
    let from = if filters.survey_period_from.is_empty() {
        None
    } else {
        period_bound(&filters.survey_period_from, false)
    };
    let to = if filters.survey_period_to.is_empty() {
        None
    } else {
        period_bound(&filters.survey_period_to, true)
    };

    households
        .iter()
        .filter(|hm| {
            let h = &hm.household;

            if !filters.barangay.is_empty()
                && h.barangay.as_deref().unwrap_or("") != filters.barangay
            {
                return false;
            }

            if !filters.purok_block_street.is_empty()
                && h.purok_sito.as_deref().unwrap_or("").trim() != filters.purok_block_street
            {
                return false;
            }

            if !filters.survey_year.is_empty() {
                if let Some(d) = survey_date(h) {
                    if d.year().to_string() != filters.survey_year {
                        return false;
                    }
                }
            }

            if from.is_some() || to.is_some() {
                if let Some(d) = survey_date(h) {
                    let t = d.naive_utc();
                    if let Some(from) = from {
                        if t < from {
                            return false;
                        }
                    }
                    if let Some(to) = to {
                        if t > to {
                            return false;
                        }
                    }
                }
            }

            true
        })
        .collect()
}

/// Reduce a household collection into one [`SurveySummary`].
///
/// Single pass, local accumulator, total over any input including the empty
/// list. Every household contributes to `totals.households` and exactly one
/// family-size bucket; members with a role outside father/mother/caregiver
/// are skipped. A household with two rows for the same role counts twice in
/// that role's histograms; enforcing at-most-one-per-role is the form
/// boundary's job, not this function's.
pub fn aggregate_summary<'a, I>(households: I) -> SurveySummary
where
    I: IntoIterator<Item = &'a HouseholdWithMembers>,
{
    let mut s = SurveySummary::default();
    let mut puroks: HashSet<String> = HashSet::new();

    for hm in households {
        let h = &hm.household;
        let n = h.number_of_members;

        s.totals.households += 1;
        // "0 families living in the house" still means one family.
        s.totals.families += h.family_living_in_house.max(1);
        if let Some(p) = &h.purok_sito {
            let p = p.trim();
            if !p.is_empty() {
                puroks.insert(p.to_string());
            }
        }
        s.totals.population += n;

        // Descending tests so boundary values resolve to the higher bucket.
        if n > 10 {
            s.family_size.more_than_10 += 1;
        } else if n >= 8 {
            s.family_size.n8_to_10 += 1;
        } else if n >= 6 {
            s.family_size.n6_to_7 += 1;
        } else if n >= 2 {
            s.family_size.n2_to_5 += 1;
        } else {
            s.family_size.n1 += 1;
        }

        s.age_health.newborn += h.newborn_male + h.newborn_female;
        s.age_health.infants += h.infant_male + h.infant_female;
        s.age_health.under_five += h.under_five_male + h.under_five_female;
        s.age_health.children_5_9 += h.children_male + h.children_female;
        s.age_health.adolescence += h.adolescence_male + h.adolescence_female;
        s.age_health.adult += h.adult_male + h.adult_female;
        s.age_health.pregnant += h.pregnant;
        s.age_health.adolescent_pregnant += h.adolescent_pregnant;
        s.age_health.post_partum += h.post_partum;
        s.age_health.women_15_49 += h.women_15_49_not_pregnant;
        s.age_health.senior_citizens += h.senior_citizen_male + h.senior_citizen_female;
        s.age_health.pwd += h.pwd_male + h.pwd_female;

        if h.couple_practicing_family_planning == Some(true) {
            s.practices.couple_fp += 1;
        }
        match codes::toilet_type(h.toilet_type) {
            Some(ToiletType::Improved) => s.practices.toilet_improved += 1,
            Some(ToiletType::Shared) => s.practices.toilet_shared += 1,
            Some(ToiletType::Unimproved) => s.practices.toilet_unimproved += 1,
            Some(ToiletType::OpenDefecation) => s.practices.toilet_open += 1,
            None => {}
        }
        match codes::water_source(h.water_source) {
            Some(WaterSource::Improved) => s.practices.water_improved += 1,
            Some(WaterSource::Unimproved) => s.practices.water_unimproved += 1,
            None => {}
        }
        match codes::food_production(h.food_production_activity.as_deref()) {
            FoodProduction::VegetableGarden => s.practices.food_vg += 1,
            FoodProduction::Fruit => s.practices.food_fruit += 1,
            FoodProduction::PoultryLivestock => s.practices.food_pl += 1,
            FoodProduction::Fishpond => s.practices.food_fp += 1,
            FoodProduction::None => s.practices.food_none += 1,
        }
        if h.using_iodized_salt {
            s.practices.iodized_salt += 1;
        }
        if h.using_iron_fortified_rice {
            s.practices.iron_fortified_rice += 1;
        }

        for m in &hm.members {
            let occ = codes::occupation_index(m.occupation.as_deref());
            let ed = codes::education_index(m.educational_attainment.as_deref());
            match m.role.as_str() {
                "father" => {
                    s.father_occ[occ] += 1;
                    s.father_ed[ed] += 1;
                }
                "mother" => {
                    s.mother_occ[occ] += 1;
                    s.mother_ed[ed] += 1;
                }
                "caregiver" => {
                    s.caregiver_occ[occ] += 1;
                    s.caregiver_ed[ed] += 1;
                }
                _ => {}
            }
        }
    }

    s.totals.purok_block_street = puroks.len() as i32;
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn base_household() -> household::Model {
        household::Model {
            id: Uuid::new_v4(),
            purok_sito: None,
            barangay: None,
            municipality_city: None,
            province: None,
            household_number: "HH-001".to_string(),
            family_living_in_house: 0,
            number_of_members: 0,
            nhts_household_group: None,
            indigenous_group: None,
            newborn_male: 0,
            newborn_female: 0,
            infant_male: 0,
            infant_female: 0,
            under_five_male: 0,
            under_five_female: 0,
            children_male: 0,
            children_female: 0,
            adolescence_male: 0,
            adolescence_female: 0,
            adult_male: 0,
            adult_female: 0,
            senior_citizen_male: 0,
            senior_citizen_female: 0,
            pwd_male: 0,
            pwd_female: 0,
            pregnant: 0,
            adolescent_pregnant: 0,
            post_partum: 0,
            women_15_49_not_pregnant: 0,
            toilet_type: None,
            water_source: None,
            food_production_activity: None,
            couple_practicing_family_planning: None,
            using_iodized_salt: false,
            using_iron_fortified_rice: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn member(
        role: &str,
        occupation: Option<&str>,
        education: Option<&str>,
    ) -> household_member::Model {
        household_member::Model {
            id: Uuid::new_v4(),
            household_id: Uuid::new_v4(),
            name: None,
            role: role.to_string(),
            occupation: occupation.map(str::to_string),
            educational_attainment: education.map(str::to_string),
            practicing_family_planning: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn wrap(household: household::Model) -> HouseholdWithMembers {
        HouseholdWithMembers {
            household,
            members: vec![],
        }
    }

    fn created_at(year: i32, month: u32, day: u32) -> Option<chrono::DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_input_yields_all_zero_summary() {
        let s = aggregate_summary(apply_filters(&[], &SummaryFilters::default()));
        assert_eq!(s.totals.households, 0);
        assert_eq!(s.totals.families, 0);
        assert_eq!(s.totals.purok_block_street, 0);
        assert_eq!(s.totals.population, 0);
        assert_eq!(s.father_occ, [0; 11]);
        assert_eq!(s.mother_ed, [0; 9]);
        assert_eq!(s, SurveySummary::default());
    }

    #[test]
    fn test_family_size_bucket_boundaries() {
        let households: Vec<HouseholdWithMembers> = [0, 1, 2, 5, 6, 7, 8, 10, 11]
            .iter()
            .map(|&n| {
                let mut h = base_household();
                h.number_of_members = n;
                wrap(h)
            })
            .collect();

        let s = aggregate_summary(&households);
        assert_eq!(s.family_size.n1, 2); // 0 and 1
        assert_eq!(s.family_size.n2_to_5, 2); // 2 and 5
        assert_eq!(s.family_size.n6_to_7, 2); // 6 and 7
        assert_eq!(s.family_size.n8_to_10, 2); // 8 and 10
        assert_eq!(s.family_size.more_than_10, 1); // 11
    }

    #[test]
    fn test_family_size_buckets_conserve_household_total() {
        let households: Vec<HouseholdWithMembers> = (0..=15)
            .map(|n| {
                let mut h = base_household();
                h.number_of_members = n;
                wrap(h)
            })
            .collect();

        let s = aggregate_summary(&households);
        let bucket_sum = s.family_size.more_than_10
            + s.family_size.n8_to_10
            + s.family_size.n6_to_7
            + s.family_size.n2_to_5
            + s.family_size.n1;
        assert_eq!(bucket_sum, s.totals.households);
        assert_eq!(s.totals.households, households.len() as i32);
    }

    #[test]
    fn test_family_count_falls_back_to_one() {
        let mut a = base_household();
        a.family_living_in_house = 0;
        let mut b = base_household();
        b.family_living_in_house = 3;

        let s = aggregate_summary(&[wrap(a), wrap(b)]);
        assert_eq!(s.totals.families, 4);
    }

    #[test]
    fn test_distinct_purok_count_trims_and_skips_empty() {
        let households: Vec<HouseholdWithMembers> =
            [Some("Purok 1"), Some(" Purok 1 "), Some("Purok 2"), Some("   "), None]
                .iter()
                .map(|p| {
                    let mut h = base_household();
                    h.purok_sito = p.map(str::to_string);
                    wrap(h)
                })
                .collect();

        let s = aggregate_summary(&households);
        assert_eq!(s.totals.purok_block_street, 2);
    }

    #[test]
    fn test_unknown_occupation_code_counts_as_none() {
        let mut h = base_household();
        h.number_of_members = 1;
        let hm = HouseholdWithMembers {
            household: h,
            members: vec![member("father", Some("99"), Some("CG"))],
        };

        let s = aggregate_summary(&[hm]);
        assert_eq!(s.father_occ[10], 1);
        assert_eq!(s.father_occ.iter().sum::<i32>(), 1);
        assert_eq!(s.father_ed[6], 1);
    }

    #[test]
    fn test_missing_education_counts_as_none() {
        let hm = HouseholdWithMembers {
            household: base_household(),
            members: vec![member("mother", Some("5"), None)],
        };

        let s = aggregate_summary(&[hm]);
        assert_eq!(s.mother_ed[0], 1);
        assert_eq!(s.mother_occ[4], 1);
    }

    #[test]
    fn test_unrecognized_role_is_not_counted() {
        let hm = HouseholdWithMembers {
            household: base_household(),
            members: vec![member("sibling", Some("1"), Some("CG"))],
        };

        let s = aggregate_summary(&[hm]);
        assert_eq!(s.father_occ, [0; 11]);
        assert_eq!(s.mother_occ, [0; 11]);
        assert_eq!(s.caregiver_occ, [0; 11]);
        assert_eq!(s.father_ed, [0; 9]);
        assert_eq!(s.mother_ed, [0; 9]);
        assert_eq!(s.caregiver_ed, [0; 9]);
    }

    #[test]
    fn test_practice_codes_outside_table_count_nowhere() {
        let mut h = base_household();
        h.toilet_type = Some(7);
        h.water_source = Some(0);
        h.food_production_activity = Some("NA".to_string());

        let s = aggregate_summary(&[wrap(h)]);
        let toilet_sum = s.practices.toilet_improved
            + s.practices.toilet_shared
            + s.practices.toilet_unimproved
            + s.practices.toilet_open;
        assert_eq!(toilet_sum, 0);
        assert_eq!(s.practices.water_improved + s.practices.water_unimproved, 0);
        // Food production has a catch-all bucket.
        assert_eq!(s.practices.food_none, 1);
    }

    #[test]
    fn test_filter_and_semantics() {
        let mut combos = vec![];
        for barangay in ["A", "B"] {
            for purok in ["P1", "P2"] {
                let mut h = base_household();
                h.barangay = Some(barangay.to_string());
                h.purok_sito = Some(purok.to_string());
                combos.push(wrap(h));
            }
        }

        let filters = SummaryFilters {
            barangay: "A".to_string(),
            purok_block_street: "P1".to_string(),
            ..Default::default()
        };
        let matched = apply_filters(&combos, &filters);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].household.barangay.as_deref(), Some("A"));
        assert_eq!(matched[0].household.purok_sito.as_deref(), Some("P1"));
    }

    #[test]
    fn test_empty_filters_return_input_unchanged() {
        let households: Vec<HouseholdWithMembers> = (0..5)
            .map(|i| {
                let mut h = base_household();
                h.household_number = format!("HH-{i:03}");
                wrap(h)
            })
            .collect();

        let matched = apply_filters(&households, &SummaryFilters::default());
        let numbers: Vec<&str> = matched
            .iter()
            .map(|hm| hm.household.household_number.as_str())
            .collect();
        assert_eq!(numbers, ["HH-000", "HH-001", "HH-002", "HH-003", "HH-004"]);
    }

    #[test]
    fn test_missing_purok_never_matches_purok_filter() {
        let h = wrap(base_household());
        let filters = SummaryFilters {
            purok_block_street: "P1".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(std::slice::from_ref(&h), &filters).is_empty());
    }

    #[test]
    fn test_year_filter_prefers_updated_at() {
        let mut h = base_household();
        h.created_at = created_at(2023, 3, 1);
        h.updated_at = created_at(2024, 6, 15);
        let households = [wrap(h)];

        let by_2024 = SummaryFilters {
            survey_year: "2024".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&households, &by_2024).len(), 1);

        let by_2023 = SummaryFilters {
            survey_year: "2023".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(&households, &by_2023).is_empty());
    }

    #[test]
    fn test_household_without_timestamps_passes_date_filters() {
        let households = [wrap(base_household())];

        let filters = SummaryFilters {
            survey_year: "2024".to_string(),
            survey_period_from: "2024-01-01".to_string(),
            survey_period_to: "2024-12-31".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&households, &filters).len(), 1);
    }

    #[test]
    fn test_period_bounds_are_inclusive_calendar_days() {
        let mut early = base_household();
        early.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let mut late = base_household();
        late.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 58).unwrap());
        let mut outside = base_household();
        outside.created_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let households = [wrap(early), wrap(late), wrap(outside)];

        let filters = SummaryFilters {
            survey_period_from: "2024-05-01".to_string(),
            survey_period_to: "2024-05-31".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&households, &filters).len(), 2);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut h = base_household();
        h.number_of_members = 4;
        h.purok_sito = Some("Purok 3".to_string());
        h.using_iodized_salt = true;
        let households = vec![HouseholdWithMembers {
            household: h,
            members: vec![member("father", Some("2"), Some("CG"))],
        }];
        let filters = SummaryFilters::default();

        let first = aggregate_summary(apply_filters(&households, &filters));
        let second = aggregate_summary(apply_filters(&households, &filters));
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_household_scenario() {
        let mut h1 = base_household();
        h1.number_of_members = 5;
        h1.family_living_in_house = 1;
        h1.barangay = Some("Baclaran".to_string());
        h1.purok_sito = Some("Purok 1".to_string());
        h1.infant_female = 1;
        h1.using_iodized_salt = true;
        h1.toilet_type = Some(1);
        let h1 = HouseholdWithMembers {
            household: h1,
            members: vec![
                member("father", Some("6"), Some("EG")),
                member("mother", Some("11"), Some("HG")),
            ],
        };

        let mut h2 = base_household();
        h2.number_of_members = 2;
        h2.family_living_in_house = 1;
        h2.barangay = Some("Sala".to_string());
        h2.purok_sito = Some("Purok 1".to_string());
        let h2 = wrap(h2);

        let households = vec![h1, h2];
        let s = aggregate_summary(&households);
        assert_eq!(s.totals.households, 2);
        assert_eq!(s.totals.families, 2);
        assert_eq!(s.totals.population, 7);
        assert_eq!(s.totals.purok_block_street, 1);
        assert_eq!(s.family_size.n2_to_5, 2);
        assert_eq!(s.age_health.infants, 1);
        assert_eq!(s.practices.toilet_improved, 1);
        assert_eq!(s.practices.iodized_salt, 1);
        assert_eq!(s.father_occ[5], 1);
        assert_eq!(s.father_ed[2], 1);
        assert_eq!(s.mother_occ[10], 1);
        assert_eq!(s.mother_ed[4], 1);

        let filters = SummaryFilters {
            barangay: "Baclaran".to_string(),
            ..Default::default()
        };
        let filtered = aggregate_summary(apply_filters(&households, &filters));
        assert_eq!(filtered.totals.households, 1);
        assert_eq!(filtered.totals.population, 5);
        assert_eq!(filtered.mother_occ[10], 1);
        assert_eq!(filtered.practices.iodized_salt, 1);
    }
}

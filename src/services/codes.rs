//! Fixed code tables from BNS Form No. 1A.
//!
//! Histogram bins are positional: `OCC_LABELS[i]` / `ED_LABELS[i]` describe
//! the value at index `i` of the summary arrays, so the index functions and
//! the label arrays must stay aligned.

/// Occupation codes 1-11, index = code - 1.
pub const OCC_LABELS: [&str; 11] = [
    "1_Manager",
    "2_Professional",
    "3_Technician & Associate Professionals",
    "4_Clerical Support Workers",
    "5_Service & Sales Workers",
    "6_Skilled agricultural, forestry & fishery workers",
    "7_Craft & related trade workers",
    "8_Plant & machine operators & assemblers",
    "9_Elementary occupations",
    "10_Armed Forces Occupations",
    "11_None",
];

/// Educational attainment codes in fixed form order.
pub const ED_LABELS: [&str; 9] = [
    "N_None",
    "EU_Elem undergraduate",
    "EG_Elem graduate",
    "HU_High school undergraduate",
    "HG_High school graduate",
    "CU_College undergraduate",
    "CG_College graduate",
    "V_Vocational",
    "PG_Post graduate studies",
];

/// Map an occupation code to its histogram index. Unknown or absent codes
/// fall back to index 10 ("11_None").
pub fn occupation_index(code: Option<&str>) -> usize {
    match code.map(str::trim) {
        Some("1") => 0,
        Some("2") => 1,
        Some("3") => 2,
        Some("4") => 3,
        Some("5") => 4,
        Some("6") => 5,
        Some("7") => 6,
        Some("8") => 7,
        Some("9") => 8,
        Some("10") => 9,
        Some("11") => 10,
        _ => 10,
    }
}

/// Map an educational attainment code to its histogram index. Codes are
/// case-normalized; unknown or absent codes fall back to index 0 ("N_None").
pub fn education_index(code: Option<&str>) -> usize {
    match code.map(|c| c.trim().to_uppercase()).as_deref() {
        Some("N") => 0,
        Some("EU") => 1,
        Some("EG") => 2,
        Some("HU") => 3,
        Some("HG") => 4,
        Some("CU") => 5,
        Some("CG") => 6,
        Some("V") => 7,
        Some("PG") => 8,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToiletType {
    Improved,
    Shared,
    Unimproved,
    OpenDefecation,
}

/// Toilet type codes 1-4. Codes outside the table count toward no bucket.
pub fn toilet_type(code: Option<i32>) -> Option<ToiletType> {
    match code {
        Some(1) => Some(ToiletType::Improved),
        Some(2) => Some(ToiletType::Shared),
        Some(3) => Some(ToiletType::Unimproved),
        Some(4) => Some(ToiletType::OpenDefecation),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterSource {
    Improved,
    Unimproved,
}

/// Water source codes 1-2. Codes outside the table count toward no bucket.
pub fn water_source(code: Option<i32>) -> Option<WaterSource> {
    match code {
        Some(1) => Some(WaterSource::Improved),
        Some(2) => Some(WaterSource::Unimproved),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodProduction {
    VegetableGarden,
    Fruit,
    PoultryLivestock,
    Fishpond,
    None,
}

/// Food production activity. Unlike toilet/water this classification is
/// total: NA, empty, absent, and unknown values all land in `None`.
pub fn food_production(code: Option<&str>) -> FoodProduction {
    match code.map(|c| c.trim().to_uppercase()).as_deref() {
        Some("VG") => FoodProduction::VegetableGarden,
        Some("FT") => FoodProduction::Fruit,
        Some("PL") => FoodProduction::PoultryLivestock,
        Some("FP") => FoodProduction::Fishpond,
        _ => FoodProduction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupation_index_known_codes() {
        for code in 1..=11 {
            let s = code.to_string();
            assert_eq!(occupation_index(Some(&s)), code - 1);
        }
    }

    #[test]
    fn test_occupation_index_fallback() {
        assert_eq!(occupation_index(Some("99")), 10);
        assert_eq!(occupation_index(Some("0")), 10);
        assert_eq!(occupation_index(Some("")), 10);
        assert_eq!(occupation_index(None), 10);
    }

    #[test]
    fn test_education_index_known_codes() {
        let codes = ["N", "EU", "EG", "HU", "HG", "CU", "CG", "V", "PG"];
        for (i, code) in codes.iter().enumerate() {
            assert_eq!(education_index(Some(code)), i);
        }
    }

    #[test]
    fn test_education_index_case_insensitive() {
        assert_eq!(education_index(Some("hg")), 4);
        assert_eq!(education_index(Some(" pg ")), 8);
    }

    #[test]
    fn test_education_index_fallback() {
        assert_eq!(education_index(Some("XX")), 0);
        assert_eq!(education_index(None), 0);
    }

    #[test]
    fn test_toilet_and_water_codes_outside_table() {
        assert_eq!(toilet_type(Some(5)), None);
        assert_eq!(toilet_type(None), None);
        assert_eq!(water_source(Some(0)), None);
        assert_eq!(water_source(None), None);
    }

    #[test]
    fn test_food_production_is_total() {
        assert_eq!(food_production(Some("vg")), FoodProduction::VegetableGarden);
        assert_eq!(food_production(Some("NA")), FoodProduction::None);
        assert_eq!(food_production(Some("")), FoodProduction::None);
        assert_eq!(food_production(Some("other")), FoodProduction::None);
        assert_eq!(food_production(None), FoodProduction::None);
    }

    #[test]
    fn test_labels_align_with_index_ranges() {
        assert_eq!(OCC_LABELS.len(), 11);
        assert_eq!(ED_LABELS.len(), 9);
        assert!(OCC_LABELS[occupation_index(Some("6"))].starts_with("6_"));
        assert!(ED_LABELS[education_index(Some("EG"))].starts_with("EG_"));
    }
}

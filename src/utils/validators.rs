use thiserror::Error;

/// Rejection reasons for BNS form fields. Validation happens once at the
/// API boundary; the summary service assumes stored codes may still be
/// arbitrary and falls back instead of failing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("household_number is required")]
    MissingHouseholdNumber,
    #[error("{field} must not be negative")]
    NegativeCount { field: &'static str },
    #[error("invalid {field} code '{value}'")]
    InvalidCode { field: &'static str, value: String },
}

fn invalid(field: &'static str, value: impl ToString) -> ValidationError {
    ValidationError::InvalidCode {
        field,
        value: value.to_string(),
    }
}

pub fn validate_household_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingHouseholdNumber);
    }
    Ok(())
}

pub fn validate_count(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeCount { field });
    }
    Ok(())
}

/// 1-NHTS 4Ps, 2-NHTS Non-4Ps, 3-Non-NHTS
pub fn validate_nhts_group(value: &str) -> Result<(), ValidationError> {
    match value.trim() {
        "1" | "2" | "3" => Ok(()),
        other => Err(invalid("nhts_household_group", other)),
    }
}

/// 1-IP, 2-Non-IP
pub fn validate_indigenous_group(value: &str) -> Result<(), ValidationError> {
    match value.trim() {
        "1" | "2" => Ok(()),
        other => Err(invalid("indigenous_group", other)),
    }
}

/// 1-Improved, 2-Shared, 3-Unimproved, 4-Open defecation
pub fn validate_toilet_type(value: i32) -> Result<(), ValidationError> {
    match value {
        1..=4 => Ok(()),
        other => Err(invalid("toilet_type", other)),
    }
}

/// 1-Improved, 2-Unimproved
pub fn validate_water_source(value: i32) -> Result<(), ValidationError> {
    match value {
        1 | 2 => Ok(()),
        other => Err(invalid("water_source", other)),
    }
}

/// VG, FT, PL, FP, NA
pub fn validate_food_production(value: &str) -> Result<(), ValidationError> {
    match value.trim().to_uppercase().as_str() {
        "VG" | "FT" | "PL" | "FP" | "NA" => Ok(()),
        other => Err(invalid("food_production_activity", other)),
    }
}

pub fn validate_role(value: &str) -> Result<(), ValidationError> {
    match value {
        "father" | "mother" | "caregiver" => Ok(()),
        other => Err(invalid("role", other)),
    }
}

/// Occupation codes "1".."11" (11 = None)
pub fn validate_occupation_code(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<i32>() {
        Ok(1..=11) => Ok(()),
        _ => Err(invalid("occupation", value)),
    }
}

/// N, EU, EG, HU, HG, CU, CG, V, PG
pub fn validate_education_code(value: &str) -> Result<(), ValidationError> {
    match value.trim().to_uppercase().as_str() {
        "N" | "EU" | "EG" | "HU" | "HG" | "CU" | "CG" | "V" | "PG" => Ok(()),
        other => Err(invalid("educational_attainment", other)),
    }
}

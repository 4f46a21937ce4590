use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, LoaderTrait, QueryOrder};

use crate::models::{household, household_member};
use crate::services::summary::{
    aggregate_summary, apply_filters, BasicInfo, HouseholdWithMembers, SummaryFilters,
};

/// Full household snapshot, oldest first, with members attached. The
/// summary is always computed over the whole set in memory; the filter
/// criteria are applied by the pure filter, not by SQL.
pub(crate) async fn fetch_all_households(
    db: &DatabaseConnection,
) -> Result<Vec<HouseholdWithMembers>, actix_web::Error> {
    let households = household::Entity::find()
        .order_by_asc(household::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let members = households
        .load_many(household_member::Entity, db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    Ok(households
        .into_iter()
        .zip(members)
        .map(|(household, members)| HouseholdWithMembers { household, members })
        .collect())
}

/// Presentation labels echoing the report criteria. The year label falls
/// back to the current year when no year filter was supplied; this is the
/// only place the wall clock is consulted.
pub(crate) fn basic_info(filters: &SummaryFilters) -> BasicInfo {
    let survey_period = match (
        filters.survey_period_from.as_str(),
        filters.survey_period_to.as_str(),
    ) {
        ("", "") => String::new(),
        (from, "") => format!("from {}", from),
        ("", to) => format!("until {}", to),
        (from, to) => format!("{} to {}", from, to),
    };

    BasicInfo {
        bns: filters.bns.clone(),
        barangay: filters.barangay.clone(),
        purok_block_street: filters.purok_block_street.clone(),
        survey_period,
        survey_year: if filters.survey_year.is_empty() {
            Utc::now().year().to_string()
        } else {
            filters.survey_year.clone()
        },
    }
}

/// GET /households/summary
/// The Family Profile Survey Summary for the filtered household set.
pub async fn get_summary(
    db: web::Data<DatabaseConnection>,
    query: web::Query<SummaryFilters>,
) -> Result<impl Responder, actix_web::Error> {
    let filters = query.into_inner();
    let households = fetch_all_households(db.get_ref()).await?;
    let filtered = apply_filters(&households, &filters);

    log::info!(
        "Summary requested: {} of {} households match the criteria",
        filtered.len(),
        households.len()
    );

    let mut summary = aggregate_summary(filtered);
    summary.basic = basic_info(&filters);

    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_info_echoes_filters() {
        let filters = SummaryFilters {
            bns: "J. Dela Cruz".to_string(),
            barangay: "Banlic".to_string(),
            purok_block_street: "Purok 2".to_string(),
            survey_year: "2025".to_string(),
            survey_period_from: "2025-01-01".to_string(),
            survey_period_to: "2025-06-30".to_string(),
        };
        let basic = basic_info(&filters);
        assert_eq!(basic.bns, "J. Dela Cruz");
        assert_eq!(basic.barangay, "Banlic");
        assert_eq!(basic.survey_year, "2025");
        assert_eq!(basic.survey_period, "2025-01-01 to 2025-06-30");
    }

    #[test]
    fn test_basic_info_defaults_year_label() {
        let basic = basic_info(&SummaryFilters::default());
        assert_eq!(basic.survey_year.len(), 4);
        assert_eq!(basic.survey_period, "");
    }
}

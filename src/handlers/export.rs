use actix_web::{web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::Value;

use crate::handlers::summary::{basic_info, fetch_all_households};
use crate::services::codes::{ED_LABELS, OCC_LABELS};
use crate::services::summary::{aggregate_summary, apply_filters, SummaryFilters, SurveySummary};

/// GET /households/export
/// The full dataset with members, for JSON download.
pub async fn export_households(
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, actix_web::Error> {
    let households = fetch_all_households(db.get_ref()).await?;
    log::info!("Exporting {} households", households.len());
    Ok(HttpResponse::Ok().json(households))
}

#[derive(Debug, Serialize)]
pub struct SummaryExport {
    pub basic: crate::services::summary::BasicInfo,
    pub rows: Vec<(String, Value)>,
}

fn heading(label: &str) -> (String, Value) {
    (label.to_string(), Value::String(String::new()))
}

fn row(label: &str, value: i32) -> (String, Value) {
    (label.to_string(), Value::from(value))
}

/// Flatten a summary into the label/value rows of the BNS summary sheet, in
/// its fixed order. The client lays these rows into spreadsheet or CSV
/// cells as-is, so the values here must agree exactly with the rendered
/// summary grid.
pub(crate) fn summary_rows(s: &SurveySummary) -> Vec<(String, Value)> {
    let mut rows = vec![
        (
            "BARANGAY NUTRITION SCHOLAR".to_string(),
            Value::String(s.basic.bns.clone()),
        ),
        row("Total No. of Households", s.totals.households),
        row("Total No. of Families", s.totals.families),
        row("Family Size: more than 10", s.family_size.more_than_10),
        row("Family Size: 8-10", s.family_size.n8_to_10),
        row("Family Size: 6-7", s.family_size.n6_to_7),
        row("Family Size: 2-5", s.family_size.n2_to_5),
        row("Family Size: 1", s.family_size.n1),
        row("Total No. of Purok/Block/Street", s.totals.purok_block_street),
        row("Total Population", s.totals.population),
        heading("No. of Family Members by Age Classification & Health Risk Group:"),
        row("Newborn 0-28 days", s.age_health.newborn),
        row("Infants 29 days - 11 mos", s.age_health.infants),
        row("Under-five 1-4 years old", s.age_health.under_five),
        row("Children 5-9 years old", s.age_health.children_5_9),
        row("Adolescents 10-19 y.o.", s.age_health.adolescence),
        row("Pregnant", s.age_health.pregnant),
        row("Adolescent Pregnant", s.age_health.adolescent_pregnant),
        row("Post-Partum", s.age_health.post_partum),
        row("15-49 y.o. (non pregnant & non-PP)", s.age_health.women_15_49),
        row("Adult 20-59 y.o.", s.age_health.adult),
        row("Senior Citizens", s.age_health.senior_citizens),
        row("Persons with Disability", s.age_health.pwd),
    ];

    let histograms: [(&str, &[i32], &[&str]); 6] = [
        ("Father Occupation", &s.father_occ, &OCC_LABELS),
        ("Father Educational Attainment", &s.father_ed, &ED_LABELS),
        ("Mother Occupation", &s.mother_occ, &OCC_LABELS),
        ("Mother Educational Attainment", &s.mother_ed, &ED_LABELS),
        ("Caregiver Occupation", &s.caregiver_occ, &OCC_LABELS),
        ("Caregiver Educational Attainment", &s.caregiver_ed, &ED_LABELS),
    ];
    for (title, values, labels) in histograms {
        rows.push(heading(title));
        for (label, value) in labels.iter().zip(values) {
            rows.push(row(label, *value));
        }
    }

    rows.push(row(
        "Total No. of Couple Practicing Family Planning",
        s.practices.couple_fp,
    ));
    rows.push(heading("Households with: Toilet Type"));
    rows.push(row("Improved Sanitation", s.practices.toilet_improved));
    rows.push(row("Shared Facility", s.practices.toilet_shared));
    rows.push(row("Unimproved", s.practices.toilet_unimproved));
    rows.push(row("Open defecation", s.practices.toilet_open));
    rows.push(heading("Water Source"));
    rows.push(row("Improved water source", s.practices.water_improved));
    rows.push(row("Unimproved water source", s.practices.water_unimproved));
    rows.push(heading("Food Production"));
    rows.push(row("VG_Vegetable garden", s.practices.food_vg));
    rows.push(row("FT_Fruit", s.practices.food_fruit));
    rows.push(row("PL_Poultry/livestock", s.practices.food_pl));
    rows.push(row("FP_Fishpond", s.practices.food_fp));
    rows.push(row("NA_None", s.practices.food_none));
    rows.push(row("Households using: Iodized salt", s.practices.iodized_salt));
    rows.push(row(
        "Households using: Iron-Fortified Rice",
        s.practices.iron_fortified_rice,
    ));

    rows
}

/// GET /households/summary/export
/// The summary as flat label/value rows for spreadsheet assembly.
pub async fn export_summary(
    db: web::Data<DatabaseConnection>,
    query: web::Query<SummaryFilters>,
) -> Result<impl Responder, actix_web::Error> {
    let filters = query.into_inner();
    let households = fetch_all_households(db.get_ref()).await?;
    let filtered = apply_filters(&households, &filters);

    let mut summary = aggregate_summary(filtered);
    summary.basic = basic_info(&filters);

    let rows = summary_rows(&summary);
    Ok(HttpResponse::Ok().json(SummaryExport {
        basic: summary.basic,
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_agree_with_summary_values() {
        let mut s = SurveySummary::default();
        s.totals.households = 3;
        s.totals.families = 4;
        s.father_occ[5] = 2;
        s.mother_ed[4] = 1;
        s.practices.food_none = 3;

        let rows = summary_rows(&s);
        let find = |label: &str| {
            rows.iter()
                .find(|(l, _)| l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(find("Total No. of Households"), Value::from(3));
        assert_eq!(find("Total No. of Families"), Value::from(4));
        assert_eq!(
            find("6_Skilled agricultural, forestry & fishery workers"),
            Value::from(2)
        );
        assert_eq!(find("NA_None"), Value::from(3));
    }

    #[test]
    fn test_histogram_rows_cover_every_bin_in_order() {
        let rows = summary_rows(&SurveySummary::default());
        let father_occ_start = rows
            .iter()
            .position(|(l, _)| l == "Father Occupation")
            .unwrap();
        for (i, label) in OCC_LABELS.iter().enumerate() {
            assert_eq!(rows[father_occ_start + 1 + i].0, *label);
        }
        // One "HG_..." row per parent/caregiver education block.
        let hg_rows = rows.iter().filter(|(l, _)| l.starts_with("HG_")).count();
        assert_eq!(hg_rows, 3);
    }
}

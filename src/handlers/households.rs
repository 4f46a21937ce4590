use actix_web::{web, HttpResponse, Responder};
use anyhow::anyhow;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::{household, household_member};
use crate::services::summary::HouseholdWithMembers;
use crate::utils::validators::{self, ValidationError};

/// Form codes arrive as strings from the encoding UI but as bare numbers
/// from spreadsheet-parsed import rows. Accept both, store the string.
fn de_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Code>::deserialize(deserializer)?.map(|code| match code {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de_code")]
    pub occupation: Option<String>,
    pub educational_attainment: Option<String>,
    #[serde(default)]
    pub practicing_family_planning: bool,
}

impl MemberPayload {
    /// Import rows padded out of the fixed form grid carry member slots with
    /// nothing in them; those are dropped rather than rejected.
    pub fn is_blank(&self) -> bool {
        self.name.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.occupation.as_deref().map_or(true, |s| s.trim().is_empty())
            && self
                .educational_attainment
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdPayload {
    pub household_number: String,
    pub purok_sito: Option<String>,
    pub barangay: Option<String>,
    pub municipality_city: Option<String>,
    pub province: Option<String>,
    #[serde(default)]
    pub family_living_in_house: i32,
    #[serde(default)]
    pub number_of_members: i32,
    #[serde(default, deserialize_with = "de_code")]
    pub nhts_household_group: Option<String>,
    #[serde(default, deserialize_with = "de_code")]
    pub indigenous_group: Option<String>,
    #[serde(default)]
    pub newborn_male: i32,
    #[serde(default)]
    pub newborn_female: i32,
    #[serde(default)]
    pub infant_male: i32,
    #[serde(default)]
    pub infant_female: i32,
    #[serde(default)]
    pub under_five_male: i32,
    #[serde(default)]
    pub under_five_female: i32,
    #[serde(default)]
    pub children_male: i32,
    #[serde(default)]
    pub children_female: i32,
    #[serde(default)]
    pub adolescence_male: i32,
    #[serde(default)]
    pub adolescence_female: i32,
    #[serde(default)]
    pub adult_male: i32,
    #[serde(default)]
    pub adult_female: i32,
    #[serde(default)]
    pub senior_citizen_male: i32,
    #[serde(default)]
    pub senior_citizen_female: i32,
    #[serde(default)]
    pub pwd_male: i32,
    #[serde(default)]
    pub pwd_female: i32,
    #[serde(default)]
    pub pregnant: i32,
    #[serde(default)]
    pub adolescent_pregnant: i32,
    #[serde(default)]
    pub post_partum: i32,
    #[serde(default)]
    pub women_15_49_not_pregnant: i32,
    pub toilet_type: Option<i32>,
    pub water_source: Option<i32>,
    pub food_production_activity: Option<String>,
    pub couple_practicing_family_planning: Option<bool>,
    #[serde(default)]
    pub using_iodized_salt: bool,
    #[serde(default)]
    pub using_iron_fortified_rice: bool,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
}

fn validate_payload(p: &HouseholdPayload) -> Result<(), ValidationError> {
    validators::validate_household_number(&p.household_number)?;

    let counts = [
        ("family_living_in_house", p.family_living_in_house),
        ("number_of_members", p.number_of_members),
        ("newborn_male", p.newborn_male),
        ("newborn_female", p.newborn_female),
        ("infant_male", p.infant_male),
        ("infant_female", p.infant_female),
        ("under_five_male", p.under_five_male),
        ("under_five_female", p.under_five_female),
        ("children_male", p.children_male),
        ("children_female", p.children_female),
        ("adolescence_male", p.adolescence_male),
        ("adolescence_female", p.adolescence_female),
        ("adult_male", p.adult_male),
        ("adult_female", p.adult_female),
        ("senior_citizen_male", p.senior_citizen_male),
        ("senior_citizen_female", p.senior_citizen_female),
        ("pwd_male", p.pwd_male),
        ("pwd_female", p.pwd_female),
        ("pregnant", p.pregnant),
        ("adolescent_pregnant", p.adolescent_pregnant),
        ("post_partum", p.post_partum),
        ("women_15_49_not_pregnant", p.women_15_49_not_pregnant),
    ];
    for (field, value) in counts {
        validators::validate_count(field, value)?;
    }

    if let Some(code) = p.nhts_household_group.as_deref() {
        validators::validate_nhts_group(code)?;
    }
    if let Some(code) = p.indigenous_group.as_deref() {
        validators::validate_indigenous_group(code)?;
    }
    if let Some(code) = p.toilet_type {
        validators::validate_toilet_type(code)?;
    }
    if let Some(code) = p.water_source {
        validators::validate_water_source(code)?;
    }
    if let Some(code) = p.food_production_activity.as_deref() {
        validators::validate_food_production(code)?;
    }

    for m in p.members.iter().filter(|m| !m.is_blank()) {
        validators::validate_role(m.role.as_deref().unwrap_or(""))?;
        if let Some(code) = m.occupation.as_deref() {
            if !code.trim().is_empty() {
                validators::validate_occupation_code(code)?;
            }
        }
        if let Some(code) = m.educational_attainment.as_deref() {
            if !code.trim().is_empty() {
                validators::validate_education_code(code)?;
            }
        }
    }

    Ok(())
}

fn household_active_model(
    id: Uuid,
    p: &HouseholdPayload,
    created_at: Option<chrono::DateTime<Utc>>,
) -> household::ActiveModel {
    let now = Utc::now();
    household::ActiveModel {
        id: Set(id),
        purok_sito: Set(p.purok_sito.clone()),
        barangay: Set(p.barangay.clone()),
        municipality_city: Set(p.municipality_city.clone()),
        province: Set(p.province.clone()),
        household_number: Set(p.household_number.trim().to_string()),
        family_living_in_house: Set(p.family_living_in_house),
        number_of_members: Set(p.number_of_members),
        nhts_household_group: Set(p.nhts_household_group.clone()),
        indigenous_group: Set(p.indigenous_group.clone()),
        newborn_male: Set(p.newborn_male),
        newborn_female: Set(p.newborn_female),
        infant_male: Set(p.infant_male),
        infant_female: Set(p.infant_female),
        under_five_male: Set(p.under_five_male),
        under_five_female: Set(p.under_five_female),
        children_male: Set(p.children_male),
        children_female: Set(p.children_female),
        adolescence_male: Set(p.adolescence_male),
        adolescence_female: Set(p.adolescence_female),
        adult_male: Set(p.adult_male),
        adult_female: Set(p.adult_female),
        senior_citizen_male: Set(p.senior_citizen_male),
        senior_citizen_female: Set(p.senior_citizen_female),
        pwd_male: Set(p.pwd_male),
        pwd_female: Set(p.pwd_female),
        pregnant: Set(p.pregnant),
        adolescent_pregnant: Set(p.adolescent_pregnant),
        post_partum: Set(p.post_partum),
        women_15_49_not_pregnant: Set(p.women_15_49_not_pregnant),
        toilet_type: Set(p.toilet_type),
        water_source: Set(p.water_source),
        food_production_activity: Set(p.food_production_activity.clone()),
        couple_practicing_family_planning: Set(p.couple_practicing_family_planning),
        using_iodized_salt: Set(p.using_iodized_salt),
        using_iron_fortified_rice: Set(p.using_iron_fortified_rice),
        created_at: Set(created_at.or(Some(now))),
        updated_at: Set(Some(now)),
    }
}

fn member_active_model(household_id: Uuid, m: &MemberPayload) -> household_member::ActiveModel {
    let now = Utc::now();
    household_member::ActiveModel {
        id: Set(Uuid::new_v4()),
        household_id: Set(household_id),
        name: Set(m.name.clone()),
        role: Set(m.role.clone().unwrap_or_default()),
        occupation: Set(m.occupation.clone()),
        educational_attainment: Set(m.educational_attainment.clone()),
        practicing_family_planning: Set(m.practicing_family_planning),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub province: Option<String>,
    pub municipality_city: Option<String>,
    pub barangay: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<HouseholdWithMembers>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// GET /households
/// Paginated household list with members, newest first.
pub async fn list_households(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let mut select = household::Entity::find();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(household::Column::HouseholdNumber.contains(search))
                .add(household::Column::Barangay.contains(search))
                .add(household::Column::MunicipalityCity.contains(search))
                .add(household::Column::Province.contains(search)),
        );
    }
    if let Some(province) = query.province.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(household::Column::Province.eq(province));
    }
    if let Some(city) = query.municipality_city.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(household::Column::MunicipalityCity.eq(city));
    }
    if let Some(barangay) = query.barangay.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(household::Column::Barangay.eq(barangay));
    }

    let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let paginator = select
        .order_by_desc(household::Column::CreatedAt)
        .paginate(db.get_ref(), per_page);

    let total = paginator.num_items().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;
    let total_pages = paginator.num_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;
    let households = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let members = households
        .load_many(household_member::Entity, db.get_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let data: Vec<HouseholdWithMembers> = households
        .into_iter()
        .zip(members)
        .map(|(household, members)| HouseholdWithMembers { household, members })
        .collect();

    Ok(HttpResponse::Ok().json(ListResponse {
        data,
        total,
        page,
        per_page,
        total_pages,
    }))
}

async fn household_number_exists(
    db: &DatabaseConnection,
    household_number: &str,
    barangay: Option<&str>,
    exclude: Option<Uuid>,
) -> Result<bool, sea_orm::DbErr> {
    let mut select = household::Entity::find()
        .filter(household::Column::HouseholdNumber.eq(household_number));
    if let Some(barangay) = barangay {
        select = select.filter(household::Column::Barangay.eq(barangay));
    }
    if let Some(id) = exclude {
        select = select.filter(household::Column::Id.ne(id));
    }
    Ok(select.count(db).await? > 0)
}

/// POST /households
pub async fn create_household(
    db: web::Data<DatabaseConnection>,
    payload: web::Json<HouseholdPayload>,
) -> Result<impl Responder, actix_web::Error> {
    let payload = payload.into_inner();

    if let Err(e) = validate_payload(&payload) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })));
    }

    let duplicate = household_number_exists(
        db.get_ref(),
        payload.household_number.trim(),
        payload.barangay.as_deref(),
        None,
    )
    .await
    .map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;
    if duplicate {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": format!(
                "Household number '{}' already exists in this barangay",
                payload.household_number.trim()
            )
        })));
    }

    let household_id = Uuid::new_v4();
    let txn = db.begin().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    household_active_model(household_id, &payload, None)
        .insert(&txn)
        .await
        .map_err(|e| {
            log::error!("Failed to create household: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to create household")
        })?;

    for member in payload.members.iter().filter(|m| !m.is_blank()) {
        member_active_model(household_id, member)
            .insert(&txn)
            .await
            .map_err(|e| {
                log::error!("Failed to create household member: {}", e);
                actix_web::error::ErrorInternalServerError("Failed to create household member")
            })?;
    }

    txn.commit().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    log::info!(
        "Household '{}' created (ID: {})",
        payload.household_number.trim(),
        household_id
    );

    let data = load_household(db.get_ref(), household_id).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Household created successfully",
        "data": data,
    })))
}

async fn load_household(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<HouseholdWithMembers, actix_web::Error> {
    let household = household::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Household not found"))?;

    let members = household
        .find_related(household_member::Entity)
        .all(db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    Ok(HouseholdWithMembers { household, members })
}

/// GET /households/{id}
pub async fn get_household(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let data = load_household(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(data))
}

/// PUT /households/{id}
///
/// Members are reconciled wholesale: rows resubmitted with an id are
/// updated, rows without an id are inserted, and rows not resubmitted are
/// deleted. An empty member list leaves the existing members untouched.
pub async fn update_household(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    payload: web::Json<HouseholdPayload>,
) -> Result<impl Responder, actix_web::Error> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    if let Err(e) = validate_payload(&payload) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })));
    }

    let existing = household::Entity::find_by_id(id)
        .one(db.get_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;
    let existing = match existing {
        Some(h) => h,
        None => {
            return Ok(HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "Household not found" })))
        }
    };

    let duplicate = household_number_exists(
        db.get_ref(),
        payload.household_number.trim(),
        payload.barangay.as_deref(),
        Some(id),
    )
    .await
    .map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;
    if duplicate {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": format!(
                "Household number '{}' already exists in this barangay",
                payload.household_number.trim()
            )
        })));
    }

    let txn = db.begin().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    household_active_model(id, &payload, existing.created_at)
        .update(&txn)
        .await
        .map_err(|e| {
            log::error!("Failed to update household: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to update household")
        })?;

    let submitted: Vec<&MemberPayload> =
        payload.members.iter().filter(|m| !m.is_blank()).collect();
    if !submitted.is_empty() {
        let mut kept_ids: Vec<Uuid> = Vec::with_capacity(submitted.len());

        for member in submitted {
            match member.id {
                Some(member_id) => {
                    let existing_member = household_member::Entity::find_by_id(member_id)
                        .filter(household_member::Column::HouseholdId.eq(id))
                        .one(&txn)
                        .await
                        .map_err(|e| {
                            log::error!("Database error: {}", e);
                            actix_web::error::ErrorInternalServerError("Database error")
                        })?;

                    if let Some(existing_member) = existing_member {
                        let mut active: household_member::ActiveModel = existing_member.into();
                        active.name = Set(member.name.clone());
                        active.role = Set(member.role.clone().unwrap_or_default());
                        active.occupation = Set(member.occupation.clone());
                        active.educational_attainment =
                            Set(member.educational_attainment.clone());
                        active.practicing_family_planning =
                            Set(member.practicing_family_planning);
                        active.updated_at = Set(Some(Utc::now()));
                        active.update(&txn).await.map_err(|e| {
                            log::error!("Failed to update household member: {}", e);
                            actix_web::error::ErrorInternalServerError(
                                "Failed to update household member",
                            )
                        })?;
                        kept_ids.push(member_id);
                    }
                }
                None => {
                    let active = member_active_model(id, member);
                    let inserted = active.insert(&txn).await.map_err(|e| {
                        log::error!("Failed to create household member: {}", e);
                        actix_web::error::ErrorInternalServerError(
                            "Failed to create household member",
                        )
                    })?;
                    kept_ids.push(inserted.id);
                }
            }
        }

        household_member::Entity::delete_many()
            .filter(household_member::Column::HouseholdId.eq(id))
            .filter(household_member::Column::Id.is_not_in(kept_ids))
            .exec(&txn)
            .await
            .map_err(|e| {
                log::error!("Failed to prune household members: {}", e);
                actix_web::error::ErrorInternalServerError("Failed to prune household members")
            })?;
    }

    txn.commit().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let data = load_household(db.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Household updated successfully",
        "data": data,
    })))
}

/// DELETE /households/{id}
pub async fn delete_household(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let id = path.into_inner();

    let household = household::Entity::find_by_id(id)
        .one(db.get_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;
    let household = match household {
        Some(h) => h,
        None => {
            return Ok(HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "Household not found" })))
        }
    };

    let txn = db.begin().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    household_member::Entity::delete_many()
        .filter(household_member::Column::HouseholdId.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| {
            log::error!("Failed to delete household members: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to delete household members")
        })?;

    household.delete(&txn).await.map_err(|e| {
        log::error!("Failed to delete household: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to delete household")
    })?;

    txn.commit().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    log::info!("Household {} deleted", id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Household deleted successfully"
    })))
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicateQuery {
    pub household_number: String,
    pub barangay: Option<String>,
}

/// GET /households/check-duplicate
/// The encoding form asks before submitting whether a HH No. is taken in
/// the given barangay.
pub async fn check_duplicate(
    db: web::Data<DatabaseConnection>,
    query: web::Query<CheckDuplicateQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let exists = household_number_exists(
        db.get_ref(),
        query.household_number.trim(),
        query.barangay.as_deref(),
        None,
    )
    .await
    .map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "exists": exists })))
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub households: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// POST /households/import
///
/// Rows come from the client-side BNS form spreadsheet parser as JSON. Each
/// row is parsed, validated, and inserted independently so one bad row
/// never aborts the batch.
pub async fn import_households(
    db: web::Data<DatabaseConnection>,
    req: web::Json<ImportRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let rows = req.into_inner().households;
    let total = rows.len();
    let mut successful = 0usize;
    let mut failed = 0usize;
    let mut errors: Vec<String> = Vec::new();

    log::info!("Importing {} household rows", total);

    for (index, row) in rows.into_iter().enumerate() {
        match import_row(db.get_ref(), row).await {
            Ok(()) => successful += 1,
            Err(e) => {
                failed += 1;
                errors.push(format!("Row {}: {}", index + 1, e));
            }
        }
    }

    log::info!(
        "Import finished: {} successful, {} failed of {}",
        successful,
        failed,
        total
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Import completed. {} successful, {} failed.", successful, failed),
        "stats": ImportStats { total, successful, failed },
        "errors": errors,
    })))
}

async fn import_row(db: &DatabaseConnection, row: serde_json::Value) -> anyhow::Result<()> {
    let payload: HouseholdPayload =
        serde_json::from_value(row).map_err(|e| anyhow!("invalid row: {}", e))?;

    validate_payload(&payload)?;

    let duplicate = household_number_exists(db, payload.household_number.trim(), None, None)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            anyhow!("database error")
        })?;
    if duplicate {
        return Err(anyhow!(
            "Household number '{}' already exists",
            payload.household_number.trim()
        ));
    }

    let household_id = Uuid::new_v4();
    let txn = db.begin().await?;

    household_active_model(household_id, &payload, None)
        .insert(&txn)
        .await
        .map_err(|e| anyhow!("failed to insert household: {}", e))?;

    for member in payload.members.iter().filter(|m| !m.is_blank()) {
        member_active_model(household_id, member)
            .insert(&txn)
            .await
            .map_err(|e| anyhow!("failed to insert household member: {}", e))?;
    }

    txn.commit().await?;

    Ok(())
}

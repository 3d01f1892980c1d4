//! In-memory imitation of the partner API, served under `/api/partners/v1`.
//!
//! Answers in the same shapes as the real service: `{"employer": ...}`,
//! `{"employers": [...]}`, paginated `{page, total_pages, ..., records}`,
//! and `{"errors": ...}` / `{"status": 404, "error": ...}` on failure.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/partners/v1";
pub const PARTNER_EMAIL: &str = "partner@example.org";
pub const PARTNER_PASSWORD: &str = "secret";
/// Always accepted, as if issued by an earlier login.
pub const STATIC_TOKEN: &str = "static-test-token";

const COUNTRIES: [&str; 3] = ["BE", "FR", "ES"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub country_code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employer {
    pub id: u64,
    pub name: String,
    pub sector_id: u64,
    pub locations: Vec<Location>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sector {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Data {
    pub employers: Vec<Employer>,
    pub sectors: Vec<Sector>,
    tokens: HashSet<String>,
}

impl Data {
    /// `employers` employers spread over `sectors` sectors and three countries.
    pub fn seeded(employers: u64, sectors: u64) -> Self {
        let sectors: Vec<Sector> = (1..=sectors)
            .map(|id| Sector {
                id,
                name: format!("Sector {id}"),
            })
            .collect();
        let sector_count = u64::try_from(sectors.len()).unwrap_or(u64::MAX).max(1);
        let employers = (1..=employers)
            .map(|id| {
                let index = usize::try_from(id - 1).unwrap_or(usize::MAX);
                Employer {
                    id,
                    name: format!("Employer {id}"),
                    sector_id: 1 + (id - 1) % sector_count,
                    locations: vec![Location {
                        country_code: COUNTRIES[index % COUNTRIES.len()].to_string(),
                    }],
                }
            })
            .collect();
        Self {
            employers,
            sectors,
            tokens: HashSet::new(),
        }
    }
}

pub type Db = Arc<RwLock<Data>>;

/// Router over the default data set: 30 employers, 20 sectors.
pub fn app() -> Router {
    app_with(Data::seeded(30, 20))
}

pub fn app_with(data: Data) -> Router {
    let db: Db = Arc::new(RwLock::new(data));
    let api = Router::new()
        .route("/sign_in", post(sign_in))
        .route("/employers", get(list_employers).post(create_employer))
        .route("/employers/search", get(search_employers))
        .route("/employers/{id}", get(get_employer))
        .route("/sectors", get(list_sectors))
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
pub struct SignIn {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub employer_name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEmployer {
    pub employer: NewEmployer,
}

#[derive(Deserialize)]
pub struct NewEmployer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector_id: String,
    pub locations_attributes: Option<Location>,
}

fn errors(status: StatusCode, payload: serde_json::Value) -> Response {
    (status, Json(json!({ "errors": payload }))).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status": 404, "error": "Not Found"})),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Response> {
    let token = bearer(headers).unwrap_or_default();
    if token == STATIC_TOKEN || db.read().await.tokens.contains(token) {
        return Ok(());
    }
    Err(errors(
        StatusCode::UNAUTHORIZED,
        json!("You need to sign in or sign up before continuing."),
    ))
}

async fn sign_in(State(db): State<Db>, Json(input): Json<SignIn>) -> Response {
    if input.email != PARTNER_EMAIL {
        return not_found();
    }
    if input.password != PARTNER_PASSWORD {
        return errors(StatusCode::UNAUTHORIZED, json!("Invalid email or password."));
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    tracing::info!(email = %input.email, "partner signed in");
    Json(json!({
        "access_token": token,
        "id": 1,
        "reviews_url": "https://transparencyatwork.org/en/reviews/new"
    }))
    .into_response()
}

/// Pages are 1-based; `total_pages` is 0 for an empty collection.
fn paginate<T: Clone>(all: &[T], page: u64, per_page: u64) -> (u64, Vec<T>) {
    let per_page = per_page.max(1);
    let total = all.len() as u64;
    let total_pages = total.div_ceil(per_page);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let records = all
        .iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(usize::try_from(per_page).unwrap_or(usize::MAX))
        .cloned()
        .collect();
    (total_pages, records)
}

async fn list_employers(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(rejection) = authorize(&db, &headers).await {
        return rejection;
    }
    let data = db.read().await;
    let Some(page) = query.page else {
        return Json(json!({ "employers": data.employers })).into_response();
    };
    let per_page = query.per_page.unwrap_or(25).max(1);
    let (total_pages, records) = paginate(&data.employers, page, per_page);
    Json(json!({
        "page": page,
        "total_pages": total_pages,
        "total_records": data.employers.len(),
        "records_per_page": per_page,
        "records": records
    }))
    .into_response()
}

async fn search_employers(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    if let Err(rejection) = authorize(&db, &headers).await {
        return rejection;
    }
    let data = db.read().await;
    let name = query.employer_name.map(|n| n.to_lowercase());
    let found: Vec<&Employer> = data
        .employers
        .iter()
        .filter(|e| {
            name.as_ref()
                .map_or(true, |n| e.name.to_lowercase().contains(n.as_str()))
        })
        .filter(|e| {
            query
                .country_code
                .as_ref()
                .map_or(true, |c| e.locations.iter().any(|l| &l.country_code == c))
        })
        .collect();
    Json(json!({ "employers": found })).into_response()
}

async fn get_employer(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = authorize(&db, &headers).await {
        return rejection;
    }
    let data = db.read().await;
    let found = id
        .parse::<u64>()
        .ok()
        .and_then(|id| data.employers.iter().find(|e| e.id == id));
    match found {
        Some(employer) => Json(json!({ "employer": employer })).into_response(),
        None => not_found(),
    }
}

async fn create_employer(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateEmployer>,
) -> Response {
    if let Err(rejection) = authorize(&db, &headers).await {
        return rejection;
    }
    let input = input.employer;
    let mut data = db.write().await;

    let mut problems = serde_json::Map::new();
    if input.name.trim().is_empty() {
        problems.insert("name".to_string(), json!(["can't be blank"]));
    }
    let sector_id = input
        .sector_id
        .parse::<u64>()
        .ok()
        .filter(|id| data.sectors.iter().any(|s| s.id == *id));
    if sector_id.is_none() {
        problems.insert("sector".to_string(), json!(["must exist"]));
    }
    let location = input.locations_attributes.filter(|l| !l.country_code.is_empty());
    if location.is_none() {
        problems.insert("locations".to_string(), json!(["can't be blank"]));
    }
    let (Some(sector_id), Some(location), true) = (sector_id, location, problems.is_empty()) else {
        return errors(StatusCode::UNPROCESSABLE_ENTITY, serde_json::Value::Object(problems));
    };

    let employer = Employer {
        id: data.employers.iter().map(|e| e.id).max().unwrap_or(0) + 1,
        name: input.name.trim().to_string(),
        sector_id,
        locations: vec![location],
    };
    data.employers.push(employer.clone());
    (StatusCode::CREATED, Json(json!({ "employer": employer }))).into_response()
}

/// Sectors come back as a bare collection; `page`/`per_page` slice it but
/// no page metadata is returned.
async fn list_sectors(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(rejection) = authorize(&db, &headers).await {
        return rejection;
    }
    let data = db.read().await;
    let sectors = match query.page {
        Some(page) => paginate(&data.sectors, page, query.per_page.unwrap_or(15)).1,
        None => data.sectors.clone(),
    };
    Json(json!({ "sectors": sectors })).into_response()
}

use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{debug, instrument};

use health_helper_domain::entities::bmi::BmiCategory;
use health_helper_domain::entities::forms::MeasurementForm;

use crate::api::handlers::flow::{fail_flow, start_flow};
use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::entities::bmi::{BmiCategoryInfo, BmiResponse};
use crate::entities::common::ErrorResponse;

/// Evaluate a measurement without saving it
#[utoipa::path(
    post,
    path = "/api/v1/bmi/evaluate",
    request_body = MeasurementForm,
    responses(
        (status = 200, description = "BMI evaluated", body = BmiResponse),
        (status = 400, description = "Height or weight out of range", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "bmi"
)]
#[instrument(skip_all)]
pub async fn evaluate_bmi(
    State(state): State<AppState>,
    Json(form): Json<MeasurementForm>,
) -> Result<Json<BmiResponse>, ErrorResponse> {
    let result = state.measurements.evaluate_form(&form)?;
    Ok(Json(BmiResponse::new(&result, false)))
}

/// Evaluate a measurement and store it on the caller's profile
#[utoipa::path(
    post,
    path = "/api/v1/bmi",
    request_body = MeasurementForm,
    responses(
        (status = 200, description = "BMI evaluated and saved", body = BmiResponse),
        (status = 400, description = "Height or weight out of range", body = ErrorResponse),
        (status = 404, description = "No profile stored for the caller", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "bmi"
)]
#[instrument(skip_all, fields(user_id = %session.user_id()))]
pub async fn commit_bmi(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(form): Json<MeasurementForm>,
) -> Result<Json<BmiResponse>, ErrorResponse> {
    let ticket = start_flow(&state, &session)?;

    let result = state
        .measurements
        .commit(session.user_id(), &form)
        .await
        .map_err(|e| fail_flow(&state, &ticket, e))?;

    let applied = state.sessions.complete_flow(&ticket, |current| {
        if let Some(profile) = current.profile.as_mut() {
            profile.height = form.height_cm;
            profile.weight = form.weight_kg;
            profile.last_bmi = result.bmi_value();
        }
    });
    if !applied {
        debug!("Measurement saved but a newer flow owns the session");
    }

    Ok(Json(BmiResponse::new(&result, true)))
}

/// Category legend in ascending order of BMI
#[utoipa::path(
    get,
    path = "/api/v1/bmi/categories",
    responses(
        (status = 200, description = "All BMI categories", body = [BmiCategoryInfo])
    ),
    security(("bearer" = [])),
    tag = "bmi"
)]
pub async fn bmi_categories() -> Json<Vec<BmiCategoryInfo>> {
    Json(BmiCategory::ALL.into_iter().map(BmiCategoryInfo::from).collect())
}

use axum::extract::{Json, Query, State};
use tracing::instrument;

use health_helper_domain::entities::places::PlaceType;

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::places::{PlacesQuery, PlacesResponse};

/// Health facilities near the current position
#[utoipa::path(
    get,
    path = "/api/v1/places",
    params(PlacesQuery),
    responses(
        (status = 200, description = "Nearby places", body = PlacesResponse),
        (status = 400, description = "Unknown place type", body = ErrorResponse),
        (status = 503, description = "Current location unavailable", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "places"
)]
#[instrument(skip_all)]
pub async fn nearby_places(
    State(state): State<AppState>,
    Query(query): Query<PlacesQuery>,
) -> Result<Json<PlacesResponse>, ErrorResponse> {
    let place_type = match query.place_type.as_deref() {
        None => PlaceType::Hospital,
        Some(value) => PlaceType::parse(value).ok_or_else(|| {
            ErrorResponse::bad_request(format!(
                "Unknown place type '{}'; expected hospital, pharmacy or fitness",
                value
            ))
        })?,
    };

    let nearby = state.places.nearby(place_type).await?;
    Ok(Json(PlacesResponse::from(nearby)))
}

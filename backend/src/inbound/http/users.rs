//! User data API handlers.
//!
//! ```text
//! PATCH /api/users/update-user-data {"totalAverageWeightRatings":4.8,"numberOfRents":10}
//! GET   /api/users/fetch-user-data
//! ```
//!
//! Both endpoints act on the caller's own record, keyed by the verified
//! bearer token identity.

use actix_web::{HttpResponse, get, patch, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::UserRecord;
use crate::domain::ports::UpdateUserDataRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::envelope::FailureEnvelope;
use crate::inbound::http::schemas::UserRecordSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_number, require_field};

pub const UPDATED_MESSAGE: &str = "User data updated successfully";
pub const FETCHED_MESSAGE: &str = "User data fetched successfully";
const REQUIRED_FIELDS_MESSAGE: &str =
    "totalAverageWeightRatings and numberOfRents are required";

const RATINGS_FIELD: FieldName = FieldName::new("totalAverageWeightRatings");
const RENTS_FIELD: FieldName = FieldName::new("numberOfRents");

/// Request body for `PATCH /api/users/update-user-data`.
///
/// Fields are kept as raw JSON so the handler can tell a missing field from
/// one with the wrong type.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDataBody {
    #[schema(value_type = f64, example = 4.8)]
    pub total_average_weight_ratings: Option<Value>,
    #[schema(value_type = u64, example = 10)]
    pub number_of_rents: Option<Value>,
}

/// Success body shared by both endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDataEnvelope {
    #[schema(example = true)]
    pub success: bool,
    #[schema(value_type = UserRecordSchema)]
    pub data: UserRecord,
    #[schema(example = "User data fetched successfully")]
    pub message: String,
}

impl UserDataEnvelope {
    fn ok(data: UserRecord, message: &str) -> HttpResponse {
        HttpResponse::Ok()
            .insert_header(private_no_store_header())
            .json(Self {
                success: true,
                data,
                message: message.to_owned(),
            })
    }
}

fn parse_update_body(
    user: &AuthenticatedUser,
    body: UpdateUserDataBody,
) -> ApiResult<UpdateUserDataRequest> {
    let UpdateUserDataBody {
        total_average_weight_ratings,
        number_of_rents,
    } = body;
    let ratings = require_field(total_average_weight_ratings, RATINGS_FIELD, REQUIRED_FIELDS_MESSAGE)?;
    let rents = require_field(number_of_rents, RENTS_FIELD, REQUIRED_FIELDS_MESSAGE)?;
    Ok(UpdateUserDataRequest {
        user_id: user.user_id().clone(),
        total_average_weight_ratings: parse_number(&ratings, RATINGS_FIELD)?,
        number_of_rents: parse_number(&rents, RENTS_FIELD)?,
    })
}

/// Create or update the caller's rental statistics.
#[utoipa::path(
    patch,
    path = "/api/users/update-user-data",
    request_body = UpdateUserDataBody,
    responses(
        (status = 200, description = "Record written", body = UserDataEnvelope),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Missing or invalid token", body = FailureEnvelope),
        (status = 500, description = "Record store failure", body = FailureEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateUserData",
    security(("BearerAuth" = []))
)]
#[patch("/users/update-user-data")]
pub async fn update_user_data(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateUserDataBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_update_body(&user, payload.into_inner())?;
    let record = state.user_data.update_user_data(request).await?;
    Ok(UserDataEnvelope::ok(record, UPDATED_MESSAGE))
}

/// Return the caller's record and mark them as recently active.
#[utoipa::path(
    get,
    path = "/api/users/fetch-user-data",
    responses(
        (status = 200, description = "Record found", body = UserDataEnvelope),
        (status = 401, description = "Missing or invalid token", body = FailureEnvelope),
        (status = 404, description = "No record for this user", body = FailureEnvelope),
        (status = 500, description = "Record store failure", body = FailureEnvelope)
    ),
    tags = ["users"],
    operation_id = "fetchUserData",
    security(("BearerAuth" = []))
)]
#[get("/users/fetch-user-data")]
pub async fn fetch_user_data(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let record = state.user_data_query.fetch_user_data(user.user_id()).await?;
    Ok(UserDataEnvelope::ok(record, FETCHED_MESSAGE))
}

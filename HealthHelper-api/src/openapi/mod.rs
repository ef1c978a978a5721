use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("bearer", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,

        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::current_session,

        crate::api::handlers::bmi::evaluate_bmi,
        crate::api::handlers::bmi::commit_bmi,
        crate::api::handlers::bmi::bmi_categories,

        crate::api::handlers::profile::get_profile,

        crate::api::handlers::contacts::list_contacts,
        crate::api::handlers::contacts::add_contact,
        crate::api::handlers::contacts::update_contact,
        crate::api::handlers::contacts::delete_contact,

        crate::api::handlers::sos::send_sos,
        crate::api::handlers::places::nearby_places
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::auth::AuthResponse,
            crate::entities::auth::SessionResponse,
            crate::entities::bmi::BmiResponse,
            crate::entities::bmi::BmiCategoryInfo,
            crate::entities::profile::ProfileResponse,
            crate::entities::sos::SosRequest,
            crate::entities::sos::SosResponse,
            crate::entities::places::PlacesQuery,
            crate::entities::places::PlacesResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealth,

            health_helper_domain::entities::forms::RegisterForm,
            health_helper_domain::entities::forms::LoginForm,
            health_helper_domain::entities::forms::MeasurementForm,
            health_helper_domain::entities::forms::ContactForm,
            health_helper_domain::entities::bmi::BmiCategory,
            health_helper_domain::entities::profile::UserIdentity,
            health_helper_domain::entities::profile::UserProfile,
            health_helper_domain::entities::profile::EmergencyContact,
            health_helper_domain::entities::places::GeoPosition,
            health_helper_domain::entities::places::PlaceType,
            health_helper_domain::entities::places::PlaceInfo,
            health_helper_domain::services::ContactDispatch
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login and sessions"),
        (name = "bmi", description = "BMI calculator"),
        (name = "profile", description = "Stored user profile"),
        (name = "contacts", description = "Emergency contacts"),
        (name = "sos", description = "Emergency alerts"),
        (name = "places", description = "Nearby health facilities")
    ),
    info(
        title = "Community Health Helper API",
        version = "0.1.0",
        description = "BMI tracking, emergency contacts, SOS alerts and nearby health facilities",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

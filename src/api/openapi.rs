//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "presenza",
        description = "Identity and attendance backend for the company portal"
    ),
    paths(
        super::handlers::health::health,
        super::handlers::auth::login::login,
        super::handlers::auth::recovery::forgot_password,
        super::handlers::auth::recovery::verify_otp,
        super::handlers::auth::recovery::reset_password,
        super::handlers::attendance::stamp::check_in,
        super::handlers::attendance::stamp::check_out,
        super::handlers::attendance::reports::my_attendance,
        super::handlers::attendance::reports::logs,
    ),
    components(schemas(
        super::handlers::auth::types::Role,
        super::handlers::auth::types::LoginRequest,
        super::handlers::auth::types::LoginResponse,
        super::handlers::auth::types::UserSummary,
        super::handlers::auth::types::ForgotPasswordRequest,
        super::handlers::auth::types::VerifyOtpRequest,
        super::handlers::auth::types::ResetPasswordRequest,
        super::handlers::auth::types::MessageResponse,
        super::handlers::attendance::types::WorkStatus,
        super::handlers::attendance::types::AttendanceRecord,
        super::handlers::attendance::types::CheckInResponse,
        super::handlers::attendance::types::CheckOutResponse,
        super::handlers::attendance::types::MyAttendanceResponse,
        super::handlers::attendance::types::OwnerSummary,
        super::handlers::attendance::types::AttendanceLogRow,
    ))
)]
pub struct ApiDoc;

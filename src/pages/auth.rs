//! Login, OTP, signup and logout.

use tracing::info;

use crate::api::{ApiClient, GENERIC_FAILURE};
use crate::forms::{self, fields, FormSpec, Rule, SubmitError, Submission, OTP_REGEX, PHONE_REGEX};
use crate::models::AuthResponse;
use crate::router::Route;

pub fn login_spec() -> FormSpec {
    FormSpec::new()
        .field("email", "Email", [Rule::Required, Rule::Email])
        .field("password", "Password", [Rule::Required, Rule::MinLength(6)])
}

pub fn send_otp_spec() -> FormSpec {
    FormSpec::new().field("email", "Email", [Rule::Required, Rule::Email])
}

pub fn verify_otp_spec() -> FormSpec {
    FormSpec::new()
        .field("email", "Email", [Rule::Required, Rule::Email])
        .field(
            "otp",
            "OTP",
            [Rule::Required, Rule::Pattern(&OTP_REGEX, "OTP must be 6 digits")],
        )
}

pub fn signup_spec() -> FormSpec {
    FormSpec::new()
        .field("name", "Name", [Rule::Required, Rule::MaxLength(100)])
        .field("email", "Email", [Rule::Required, Rule::Email])
        .field("password", "Password", [Rule::Required, Rule::MinLength(6)])
        .field(
            "phone",
            "Phone",
            [Rule::Pattern(&PHONE_REGEX, "Please enter a valid phone number")],
        )
}

/// Store the returned token and pick the page to land on.
fn start_session(client: &ApiClient, response: AuthResponse) -> Result<Route, SubmitError> {
    if response.token.trim().is_empty() {
        return Err(SubmitError::Global(
            response.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ));
    }
    client.session().set(response.token.trim());
    let landing = response
        .user
        .map(|user| user.role().home())
        .unwrap_or(Route::Dashboard);
    info!(landing = %landing, "Signed in");
    Ok(landing)
}

pub async fn login_with_password(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<Route, SubmitError> {
    let values = fields([("email", email), ("password", password)]);
    let spec = login_spec();
    let response: AuthResponse = forms::submit(
        client,
        Submission::post("/api/auth/login-password", &values, &spec).anonymous(),
    )
    .await?;
    start_session(client, response)
}

/// Ask the backend to email a one-time passcode. Returns its confirmation.
pub async fn send_otp(client: &ApiClient, email: &str) -> Result<String, SubmitError> {
    let values = fields([("email", email)]);
    let spec = send_otp_spec();
    let response: serde_json::Value = forms::submit(
        client,
        Submission::post("/api/auth/send-otp", &values, &spec).anonymous(),
    )
    .await?;
    Ok(response
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("OTP sent")
        .to_string())
}

pub async fn verify_otp(client: &ApiClient, email: &str, otp: &str) -> Result<Route, SubmitError> {
    let values = fields([("email", email), ("otp", otp)]);
    let spec = verify_otp_spec();
    let response: AuthResponse = forms::submit(
        client,
        Submission::post("/api/auth/verify-otp-login", &values, &spec).anonymous(),
    )
    .await?;
    start_session(client, response)
}

pub async fn signup(client: &ApiClient, values: &forms::Fields) -> Result<Route, SubmitError> {
    let spec = signup_spec();
    let response: AuthResponse = forms::submit(
        client,
        Submission::post("/api/auth/signup", values, &spec).anonymous(),
    )
    .await?;
    start_session(client, response)
}

/// Drop the session. The next page is always the login page.
pub fn logout(client: &ApiClient) -> Route {
    client.session().clear();
    Route::Login
}

//! Login and logout.
//!
//! Authentication itself is the server's business; this module only validates input, forwards
//! credentials, and turns the reply into a [`Session`].

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, AuthApi, Credentials, UserProfile};
use crate::geo::{acquire_position, GeolocationProvider};
use crate::session::{Session, SessionError, SessionStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Screen a freshly logged-in user lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingView {
    Report,
    Attendance,
}

impl LandingView {
    pub fn for_session(session: &Session) -> Self {
        if session.role().is_admin() {
            LandingView::Report
        } else {
            LandingView::Attendance
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Persist the session ("stay logged in")
    pub remember: bool,
    /// Verify the token signature with this secret when set
    pub jwt_secret: Option<String>,
}

pub async fn login<A, G, S>(
    api: &A,
    geo: &G,
    credentials: &Credentials,
    options: &LoginOptions,
    store: &S,
) -> Result<(Session, LandingView), AuthError>
where
    A: AuthApi + ?Sized,
    G: GeolocationProvider + ?Sized,
    S: SessionStore + ?Sized,
{
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AuthError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let position = match acquire_position(geo).await {
        Ok(position) => Some(position),
        Err(e) => {
            warn!(error = %e, "Logging in without coordinates");
            None
        }
    };

    let reply = api.login(credentials, position).await?;
    if !reply.is_success() {
        let message = reply
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "invalid credentials".to_string());
        return Err(AuthError::Rejected(message));
    }

    let token = reply
        .token
        .ok_or_else(|| SessionError::Validation("login reply has no token".to_string()))?;
    let role = reply.role.unwrap_or_default();
    let session = Session::from_token(&token, &role, options.jwt_secret.as_deref())?;

    if options.remember {
        session.persist(store).await?;
    } else {
        Session::clear(store).await?;
    }

    let landing = LandingView::for_session(&session);
    info!(
        user_id = %session.user_id(),
        role = %session.role(),
        remember = options.remember,
        "Logged in"
    );
    Ok((session, landing))
}

pub async fn logout<S>(store: &S) -> Result<(), AuthError>
where
    S: SessionStore + ?Sized,
{
    Session::clear(store).await?;
    info!("Logged out");
    Ok(())
}

/// Profile of the logged-in user, for greeting purposes
pub async fn profile<A>(api: &A, session: &Session) -> Result<UserProfile, AuthError>
where
    A: AuthApi + ?Sized,
{
    Ok(api.user_profile(session.user_id()).await?)
}

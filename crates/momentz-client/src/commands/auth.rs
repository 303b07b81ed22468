use tracing::{info, warn};

use momentz_shared::validation;

use crate::coordinator::{message_or, Coordinator};
use crate::error::ApiError;
use crate::events::{Intent, Outcome};
use crate::notify::notice;
use crate::session::Session;

impl Coordinator {
    pub(crate) async fn login(&self, username: &str, password: &str) -> Outcome {
        let request = match validation::login(username, password) {
            Ok(req) => req,
            Err(e) => return Outcome::Invalid(e),
        };

        match self.api().login(&request).await {
            Ok(resp) => {
                self.session().establish(Session {
                    token: resp.token,
                    user_id: resp.id,
                    username: resp.username,
                });
                self.view().navigate();
                self.view().update(|s| s.toasts.success(notice::LOGIN_OK));
                Outcome::LoggedIn
            }
            Err(err) => {
                warn!(username = %request.username, error = %err, "Login failed");
                let notice = auth_notice(&err, notice::LOGIN_FAILED);
                self.view().update(|s| s.toasts.error(notice.clone()));
                Outcome::Rejected { notice }
            }
        }
    }

    pub(crate) async fn register(
        &self,
        email: &str,
        full_name: &str,
        username: &str,
        password: &str,
    ) -> Outcome {
        let request = match validation::registration(email, full_name, username, password) {
            Ok(req) => req,
            Err(e) => return Outcome::Invalid(e),
        };

        match self.api().register(&request).await {
            Ok(()) => {
                info!(username = %request.username, "Account registered");
                self.view()
                    .update(|s| s.toasts.success(notice::REGISTERED));
                Outcome::Registered
            }
            Err(err) => {
                warn!(username = %request.username, error = %err, "Registration failed");
                let notice = auth_notice(&err, notice::REGISTER_FAILED);
                self.view().update(|s| s.toasts.error(notice.clone()));
                Outcome::Rejected { notice }
            }
        }
    }

    pub(crate) fn logout(&self, confirmed: bool) -> Outcome {
        if !confirmed {
            return Outcome::ConfirmationRequired(Box::new(Intent::Logout { confirmed: false }));
        }
        self.session().logout();
        self.view().navigate();
        self.view().update(|s| s.profile = None);
        Outcome::LoggedOut
    }
}

fn auth_notice(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::Transport(_) => notice::CONNECTION_ERROR.to_string(),
        other => message_or(other, fallback),
    }
}

//! Outbound email
//!
//! Delivery is mocked: messages are rendered and written to the log.

/// A rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn new(from: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.frontend_url)
    }

    pub fn gym_credentials(
        &self,
        to: &str,
        gym_name: &str,
        gym_code: &str,
        temp_password: &str,
    ) -> Email {
        let body = format!(
            "Welcome to FitFlow, {gym_name}!\n\n\
             Your gym account has been created.\n\
             Gym code: {gym_code}\n\
             Email: {to}\n\
             Temporary password: {temp_password}\n\n\
             Sign in at {} and change your password.",
            self.login_url()
        );
        Email {
            from: self.from.clone(),
            to: to.to_string(),
            subject: format!("Your FitFlow gym account ({gym_code})"),
            body,
        }
    }

    /// Send gym login credentials to a newly created gym account
    pub async fn send_gym_credentials(
        &self,
        to: &str,
        gym_name: &str,
        gym_code: &str,
        temp_password: &str,
    ) {
        let email = self.gym_credentials(to, gym_name, gym_code, temp_password);
        self.deliver(&email).await;
    }

    async fn deliver(&self, email: &Email) {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            dashboard = %self.login_url(),
            "Email queued (mock delivery)"
        );
        tracing::debug!(body = %email.body, "Email body");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_email_carries_code_and_password() {
        let mailer = Mailer::new("noreply@fitflow.app", "http://localhost:3000/");
        let email = mailer.gym_credentials("gym@x.io", "FitZone", "FZ001", "Ab3dEf7h");
        assert_eq!(email.to, "gym@x.io");
        assert_eq!(email.from, "noreply@fitflow.app");
        assert!(email.subject.contains("FZ001"));
        assert!(email.body.contains("Ab3dEf7h"));
        assert!(email.body.contains("http://localhost:3000/login"));
    }
}

//! Fire-and-forget email notifications. Delivery runs off the request
//! path and any transport failure is logged, never propagated: a failed
//! notification must not fail the business operation that triggered it.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    admin: Option<String>,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Mailer {
        let (transport, from) = match &config.smtp {
            Some(smtp) => {
                let built = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .map(|builder| {
                        builder
                            .port(smtp.port)
                            .credentials(Credentials::new(
                                smtp.username.clone(),
                                smtp.password.clone(),
                            ))
                            .build()
                    });
                match (built, smtp.username.parse::<Mailbox>()) {
                    (Ok(transport), Ok(from)) => (Some(transport), Some(from)),
                    (Err(e), _) => {
                        tracing::error!("failed to build SMTP transport: {}", e);
                        (None, None)
                    }
                    (_, Err(e)) => {
                        tracing::error!("invalid sender address: {}", e);
                        (None, None)
                    }
                }
            }
            None => {
                tracing::warn!("SMTP not configured, notifications will only be logged");
                (None, None)
            }
        };

        Mailer {
            transport,
            from,
            admin: config.admin_email.clone(),
        }
    }

    /// Recipients for a customer-facing notification: the customer's own
    /// address plus the admin copy when configured. A customer without an
    /// address gets no mail at all; the admin copy only rides along with
    /// a customer send.
    pub fn customer_recipients(&self, customer_email: Option<&str>) -> Vec<String> {
        let Some(email) = customer_email.filter(|e| !e.trim().is_empty()) else {
            return Vec::new();
        };
        let mut recipients = vec![email.to_string()];
        if let Some(admin) = &self.admin {
            recipients.push(admin.clone());
        }
        recipients
    }

    pub fn admin_recipients(&self) -> Vec<String> {
        self.admin.clone().into_iter().collect()
    }

    /// Compose a plain-text message and deliver it in a detached task.
    pub fn notify(&self, subject: &str, body: &str, recipients: Vec<String>) {
        if recipients.is_empty() {
            tracing::debug!("no recipients for notification '{}'", subject);
            return;
        }
        let (Some(transport), Some(from)) = (self.transport.clone(), self.from.clone()) else {
            tracing::info!("mail disabled, skipping notification '{}'", subject);
            return;
        };

        let mut builder = Message::builder()
            .from(from)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in &recipients {
            match recipient.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.to(mailbox),
                Err(e) => tracing::warn!("skipping invalid recipient {}: {}", recipient, e),
            }
        }

        let message = match builder.body(body.to_string()) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("failed to compose notification '{}': {}", subject, e);
                return;
            }
        };

        let subject = subject.to_string();
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => tracing::info!("notification '{}' sent to {:?}", subject, recipients),
                Err(e) => tracing::error!("failed to send notification '{}': {}", subject, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::Mailer;

    fn mailer(admin: Option<&str>) -> Mailer {
        Mailer {
            transport: None,
            from: None,
            admin: admin.map(str::to_string),
        }
    }

    #[test]
    fn customer_without_address_gets_no_recipients() {
        let mailer = mailer(Some("admin@farm.test"));
        assert!(mailer.customer_recipients(None).is_empty());
        assert!(mailer.customer_recipients(Some("")).is_empty());
        assert!(mailer.customer_recipients(Some("   ")).is_empty());
    }

    #[test]
    fn admin_copy_rides_along_with_customer_address() {
        let mailer = mailer(Some("admin@farm.test"));
        assert_eq!(
            mailer.customer_recipients(Some("acme@x.test")),
            vec!["acme@x.test".to_string(), "admin@farm.test".to_string()]
        );

        let no_admin = self::mailer(None);
        assert_eq!(
            no_admin.customer_recipients(Some("acme@x.test")),
            vec!["acme@x.test".to_string()]
        );
    }
}

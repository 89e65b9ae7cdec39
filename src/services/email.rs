//! Email notifications for new appointments

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use super::notifier::{AppointmentSummary, DomainEvent, EventKind, NotificationChannel};
use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    repository::establishments::EstablishmentsRepository,
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Tell the establishment about a new booking
    pub async fn send_new_appointment(&self, to: &str, summary: &AppointmentSummary) -> AppResult<()> {
        let subject = format!(
            "New appointment: {} on {} at {}",
            summary.client_name,
            summary.date.format("%d/%m/%Y"),
            summary.time
        );
        let body = format!("A new appointment was booked.\n\n{}\n", summary.text());

        self.send_email(to, &subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Salon");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!("<html><body><p>{}</p></body></html>", body.replace('\n', "<br>"))),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => mailer_builder,
        };

        let mailer = mailer_builder.build();

        // SmtpTransport blocks on network I/O
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Emails the establishment's contact address when an appointment is booked
#[derive(Clone)]
pub struct EmailChannel {
    email: EmailService,
    establishments: EstablishmentsRepository,
}

impl EmailChannel {
    pub fn new(email: EmailService, establishments: EstablishmentsRepository) -> Self {
        Self { email, establishments }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()> {
        let summary = match (&event.kind, &event.summary) {
            (EventKind::AppointmentCreated, Some(summary)) => summary,
            _ => return Ok(()),
        };

        let establishment = self.establishments.get_by_id(event.establishment_id).await?;
        let Some(to) = establishment.contact_email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::debug!("Establishment {} has no contact email", establishment.id);
            return Ok(());
        };

        self.email.send_new_appointment(to, summary).await
    }
}

use async_trait::async_trait;
use db::models::task::Task;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::services::config::SmtpConfig;

pub const OTP_FROM_NAME: &str = "WorkHub Security";
pub const TASK_FROM_NAME: &str = "WorkHub Task Manager";

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("invalid email address: {0}")]
    Address(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("failed to send email: {0}")]
    Send(String),
}

/// A fully rendered message. The sender address is fixed per transport,
/// only its display name varies by email kind.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError>;
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from_address: Address,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, from_address: &str) -> Result<Self, MailerError> {
        let transport = SmtpTransport::relay(&smtp.host)
            .map_err(|err| MailerError::Send(err.to_string()))?
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();
        let from_address = from_address
            .parse()
            .map_err(|err: lettre::address::AddressError| MailerError::Address(err.to_string()))?;
        Ok(Self {
            transport,
            from_address,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        let OutgoingEmail {
            from_name,
            to,
            subject,
            html_body,
        } = email;
        let to: Mailbox = to
            .parse()
            .map_err(|err: lettre::address::AddressError| MailerError::Address(err.to_string()))?;
        let message = Message::builder()
            .from(Mailbox::new(Some(from_name), self.from_address.clone()))
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|err| MailerError::Build(err.to_string()))?;
        // lettre's SMTP transport is blocking.
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|err| MailerError::Send(err.to_string()))?
            .map_err(|err| MailerError::Send(err.to_string()))?;
        Ok(())
    }
}

/// Stand-in when SMTP is not configured. Messages are logged and dropped.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        tracing::info!(
            "SMTP disabled, skipping email to {} ({})",
            email.to,
            email.subject
        );
        Ok(())
    }
}

pub fn otp_email(to: &str, otp: &str) -> OutgoingEmail {
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Password Reset Request</h2>
  <p>You requested to reset your password. Use the code below to continue:</p>
  <div style="background-color: #f4f4f4; padding: 20px; text-align: center; margin: 20px 0;">
    <h1 style="color: #007bff; letter-spacing: 5px; margin: 0;">{otp}</h1>
  </div>
  <p>This code is valid for <strong>10 minutes</strong>.</p>
  <p>If you did not request a password reset, you can ignore this email.</p>
</div>"#
    );
    OutgoingEmail {
        from_name: OTP_FROM_NAME.to_string(),
        to: to.to_string(),
        subject: "Password Reset OTP".to_string(),
        html_body,
    }
}

pub fn task_assignment_email(to: &str, assigner_name: &str, task: &Task) -> OutgoingEmail {
    let priority = field_or(task.priority.as_deref(), "Medium");
    let task_type = field_or(task.task_type.as_deref(), "General");
    let status = field_or(task.status.as_deref(), "Not Started");
    let description = description_preview(task.description.as_deref());
    let due_date = task
        .due_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "No due date".to_string());
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">You have a new task</h2>
  <p><strong>{assigner_name}</strong> assigned a task to you:</p>
  <div style="background-color: #f8f9fa; border-left: 4px solid #007bff; padding: 16px; margin: 20px 0;">
    <h3 style="margin: 0 0 8px 0;">{title}</h3>
    <p style="margin: 4px 0;"><strong>Priority:</strong> {priority}</p>
    <p style="margin: 4px 0;"><strong>Type:</strong> {task_type}</p>
    <p style="margin: 4px 0;"><strong>Status:</strong> {status}</p>
    <p style="margin: 4px 0;"><strong>Due date:</strong> {due_date}</p>
    <p style="margin: 12px 0 0 0;">{description}</p>
  </div>
  <p style="color: #888; font-size: 12px;">Sent to {to}.</p>
</div>"#,
        title = task.title,
    );
    OutgoingEmail {
        from_name: TASK_FROM_NAME.to_string(),
        to: to.to_string(),
        subject: format!("🎯 New Task Assigned: {}", task.title),
        html_body,
    }
}

fn field_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn description_preview(description: Option<&str>) -> String {
    let Some(text) = description.map(str::trim).filter(|text| !text.is_empty()) else {
        return "No additional details provided.".to_string();
    };
    if text.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

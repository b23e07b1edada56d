//! Email service for delivering OTP verification codes.
//!
//! Supported providers:
//! - `console`: logs the message (development)
//! - `smtp`: sends via SMTP server
//! - `sendgrid`: uses the SendGrid API

use crate::config::EmailConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Send the OTP verification email.
    ///
    /// The body states the expiry window explicitly so a user reading a
    /// stale inbox knows the code is gone.
    pub async fn send_otp_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        otp_code: &str,
        expiry_minutes: i64,
    ) -> Result<(), EmailError> {
        let subject = "Your verification code - VetBook";

        let body_text = format!(
            r#"Hi{name},

Your VetBook verification code is:

    {code}

Enter it to finish creating your account. This code expires in {minutes} minutes.

If you didn't request an account with VetBook, you can safely ignore this email.

Best regards,
The VetBook Team"#,
            name = to_name.map(|n| format!(" {}", n)).unwrap_or_default(),
            code = otp_code,
            minutes = expiry_minutes,
        );

        let body_html = if self.config.template_style == "html" {
            Some(format!(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your verification code</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #2f9e6e; padding: 30px; border-radius: 10px 10px 0 0;">
        <h1 style="color: white; margin: 0; font-size: 24px;">VetBook</h1>
    </div>
    <div style="background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px;">
        <h2 style="color: #333; margin-top: 0;">Confirm your email address</h2>
        <p>Hi{name},</p>
        <p>Enter this code to finish creating your VetBook account:</p>
        <div style="text-align: center; margin: 30px 0;">
            <span style="background: #2f9e6e; color: white; padding: 14px 28px; border-radius: 6px; font-weight: bold; font-size: 28px; letter-spacing: 8px; display: inline-block;">{code}</span>
        </div>
        <p style="color: #666; font-size: 14px;">This code expires in {minutes} minutes.</p>
        <p style="color: #666; font-size: 14px;">If you didn't request an account with VetBook, you can safely ignore this email.</p>
    </div>
</body>
</html>"#,
                name = to_name.map(|n| format!(" {}", n)).unwrap_or_default(),
                code = otp_code,
                minutes = expiry_minutes,
            ))
        } else {
            None
        };

        let message = EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject: subject.to_string(),
            body_text,
            body_html,
        };

        self.send(message).await
    }

    /// Console provider - logs the email (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );

        info!(
            body_text = %message.body_text,
            "Email body (plain text)"
        );

        Ok(())
    }

    /// SMTP provider - sends via SMTP server.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        // TODO: wire in the lettre crate for real SMTP delivery; until then
        // the provider only logs what it would have sent.
        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            to = %message.to,
            subject = %message.subject,
            "SMTP provider configured but delivery is log-only pending lettre integration"
        );

        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });

        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let mut body = serde_json::json!({
            "personalizations": [personalizations],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        if let Some(html) = &message.body_html {
            if let Some(content) = body["content"].as_array_mut() {
                content.push(serde_json::json!({
                    "type": "text/html",
                    "value": html
                }));
            }
        }

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

//! Outbound email delivery abstraction.
//!
//! The recovery flow hands a rendered message to an injected [`EmailSender`];
//! the core never depends on a concrete transport. The default sender for
//! local dev logs the payload and reports success, mirroring a simulated
//! delivery when no SMTP relay is configured.

use anyhow::Result;
use tracing::info;

/// Message handed to the delivery channel.
#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email delivery abstraction injected into the recovery flow.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can surface a
    /// delivery failure.
    fn deliver(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn deliver(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "simulated email delivery"
        );
        Ok(())
    }
}

/// Render the password-reset OTP notification.
pub(crate) fn otp_message(email: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: email.to_string(),
        subject: "Password Reset OTP - Company Dashboard".to_string(),
        body: format!(
            "Your OTP for password reset is: {code}. This OTP will expire in 5 minutes."
        ),
    }
}

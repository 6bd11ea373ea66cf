//! OTP Delivery Adapters
//!
//! Email rendering lives outside this service. Codes are either written
//! to the log (development) or POSTed as JSON to a webhook that sends
//! the mail.

use std::time::Duration;

use serde::Serialize;

use crate::application::otp_delivery::{OtpMessage, OtpSender};
use crate::error::{ShareError, ShareResult};

/// Webhook request timeout
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// OTP delivery adapter
#[derive(Debug, Clone)]
pub enum OtpDelivery {
    /// Write the code to the log; development only
    Log,
    /// POST the message to a mailer webhook
    Webhook {
        client: reqwest::Client,
        url: String,
    },
}

impl OtpDelivery {
    pub fn webhook(url: impl Into<String>) -> ShareResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| ShareError::Internal(format!("Failed to build webhook client: {e}")))?;
        Ok(Self::Webhook {
            client,
            url: url.into(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    to: &'a str,
    code: &'a str,
    project_title: &'a str,
    expires_in_minutes: i64,
}

impl OtpSender for OtpDelivery {
    async fn send_otp(&self, message: &OtpMessage) -> ShareResult<()> {
        match self {
            OtpDelivery::Log => {
                tracing::info!(
                    to = %message.to.masked(),
                    code = message.code.as_str(),
                    project = %message.project_title,
                    "One-time code (log delivery, development only)"
                );
                Ok(())
            }
            OtpDelivery::Webhook { client, url } => {
                let payload = WebhookPayload {
                    kind: "share_otp",
                    to: message.to.as_str(),
                    code: message.code.as_str(),
                    project_title: &message.project_title,
                    expires_in_minutes: message.expires_in_minutes,
                };

                client
                    .post(url)
                    .json(&payload)
                    .send()
                    .await
                    .and_then(|res| res.error_for_status())
                    .map_err(|e| ShareError::Internal(format!("OTP webhook failed: {e}")))?;

                tracing::debug!(to = %message.to.masked(), "One-time code handed to webhook");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload {
            kind: "share_otp",
            to: "client@agency.com",
            code: "123456",
            project_title: "Launch film",
            expires_in_minutes: 10,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "share_otp");
        assert_eq!(json["projectTitle"], "Launch film");
        assert_eq!(json["expiresInMinutes"], 10);
    }

    #[tokio::test]
    async fn test_log_delivery_succeeds() {
        let message = OtpMessage {
            to: kernel::email::Email::new("client@agency.com").unwrap(),
            code: crate::domain::value_object::otp_code::OtpCode::generate(),
            project_title: "Launch film".into(),
            expires_in_minutes: 10,
        };
        assert!(OtpDelivery::Log.send_otp(&message).await.is_ok());
    }
}

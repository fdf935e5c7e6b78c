use crate::errors::AppError;
use crate::validation::ValidatedEmail;
use anyhow::Context;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// HTTP client for a Postmark-style email API. Recipients are email-to-SMS
/// gateway addresses, so a plain text body is all that gets sent.
#[derive(Clone, Debug)]
pub struct EmailClient {
    http_client: Client,
    email_server_url: String,
    sender: ValidatedEmail,
    authorization_token: String,
}

#[derive(Serialize, Debug)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    pub fn new(
        base_url: &str,
        sender: ValidatedEmail,
        authorization_token: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::SendingRequest(e.to_string()))?;
        Ok(Self {
            http_client,
            email_server_url: base_url.trim_end_matches('/').to_string(),
            sender,
            authorization_token: authorization_token.to_string(),
        })
    }

    pub async fn send_email(
        &self,
        recipients: &[ValidatedEmail],
        subject: &str,
        text_content: &str,
    ) -> anyhow::Result<()> {
        if recipients.is_empty() {
            anyhow::bail!("no recipients configured");
        }
        let to = recipients
            .iter()
            .map(|r| r.0.as_str())
            .collect::<Vec<&str>>()
            .join(",");
        let url = format!("{}/email", self.email_server_url);
        let request_body = SendEmailRequest {
            from: &self.sender.0,
            to: &to,
            subject,
            text_body: text_content,
        };
        self.http_client
            .post(&url)
            .header("X-Postmark-Server-Token", self.authorization_token.as_str())
            .json(&request_body)
            .send()
            .await
            .context("error reaching email server")?
            .error_for_status()
            .context("server returned error")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::email_client::EmailClient;
    use crate::validation::ValidatedEmail;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::{Fake, Faker};
    use std::time::Duration;

    fn subject() -> String {
        Sentence(1..2).fake()
    }

    fn content() -> String {
        Paragraph(1..10).fake()
    }

    fn email() -> ValidatedEmail {
        ValidatedEmail::parse(&SafeEmail().fake::<String>()).unwrap()
    }

    fn email_client(base_url: &str, token: &str, timeout: Duration) -> EmailClient {
        EmailClient::new(base_url, email(), token, timeout).unwrap()
    }

    #[tokio::test]
    async fn send_email_with_expected_request() {
        let mut server = mockito::Server::new_async().await;
        let tmp_token: String = Faker.fake();
        let client = email_client(&server.url(), &tmp_token, Duration::from_secs(10));

        let first = email();
        let second = email();
        let mock = server
            .mock("POST", "/email")
            .match_header("content-type", "application/json")
            .match_header("X-Postmark-Server-Token", tmp_token.as_str())
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "to": format!("{},{}", first.0, second.0),
            })))
            .expect(1)
            .create_async()
            .await;

        client
            .send_email(&[first, second], &subject(), &content())
            .await
            .expect("error sending email");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_email_with_status_200() {
        let mut server = mockito::Server::new_async().await;
        let client = email_client(&server.url(), "token", Duration::from_secs(10));

        let mock = server
            .mock("POST", "/email")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let res = client.send_email(&[email()], &subject(), &content()).await;
        assert!(res.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_email_with_status_500() {
        let mut server = mockito::Server::new_async().await;
        let client = email_client(&server.url(), "token", Duration::from_secs(10));

        let mock = server
            .mock("POST", "/email")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let res = client.send_email(&[email()], &subject(), &content()).await;
        assert!(res.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_email_with_too_slow_response() {
        let mut server = mockito::Server::new_async().await;
        let client = email_client(&server.url(), "token", Duration::from_millis(200));

        let mock = server
            .mock("POST", "/email")
            .with_status(200)
            .match_request(|_| {
                std::thread::sleep(Duration::from_millis(500));
                true
            })
            .create_async()
            .await;

        let res = client.send_email(&[email()], &subject(), &content()).await;
        assert!(res.is_err());
        drop(mock);
    }

    #[tokio::test]
    async fn send_email_without_recipients_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let client = email_client(&server.url(), "token", Duration::from_secs(10));
        let mock = server.mock("POST", "/email").expect(0).create_async().await;

        let res = client.send_email(&[], &subject(), &content()).await;
        assert!(res.is_err());
        mock.assert_async().await;
    }
}

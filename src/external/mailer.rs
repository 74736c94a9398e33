use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::MailerConfig;
use crate::error::{AppError, AppResult};

const MAILER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct SendMailBody<'a> {
    from_email: &'a str,
    from_name: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct MailerService {
    client: Client,
    config: MailerConfig,
}

impl MailerService {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 发送一封邮件。
    /// 失败会先记日志再把错误抛给调用方, 由调用方决定是否中断流程
    /// (支付流程记警告后继续, 不能因为回执没发出去丢掉已付款用户)。
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let url = format!("{}/api/send", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(MAILER_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .json(&SendMailBody {
                from_email: &self.config.sender_email,
                from_name: &self.config.sender_name,
                to,
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| {
                log::error!("Mail send failed (transport): {}, Error: {}", to, e);
                AppError::ReqwestError(e)
            })?;

        if response.status().is_success() {
            log::info!("Mail sent successfully: {}", to);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Mail send failed: {}, Error: {}", to, error_text);
            Err(AppError::ExternalApiError(format!(
                "Mail sending failed: {}",
                error_text
            )))
        }
    }
}

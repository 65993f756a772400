//! Twilio adapter for the provisioning port.
//!
//! Talks to the `2010-04-01` REST API with basic auth. Credential
//! verification fetches the account resource; everything else is scoped
//! under `/Accounts/{sid}/`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use koro_core::{
    domain::{AreaCode, NumberSid, PhoneNumber},
    provisioning::{
        error::{AccountStatus, AuthError, ProvisionError},
        port::{OwnedNumber, ProvisioningAccount, ProvisioningBackend},
    },
    Error, Result,
};

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Connects credentials to live Twilio accounts.
pub struct TwilioBackend {
    http: reqwest::Client,
    base_url: String,
}

impl TwilioBackend {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE)
    }

    /// Point the adapter at a different base URL (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client build");
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl Default for TwilioBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProvisioningBackend for TwilioBackend {
    async fn connect(
        &self,
        account_sid: &str,
        auth_token: &str,
    ) -> std::result::Result<Arc<dyn ProvisioningAccount>, AuthError> {
        let url = format!("{}/Accounts/{}.json", self.base_url, account_sid);
        let resp = self
            .http
            .get(&url)
            .basic_auth(account_sid, Some(auth_token))
            .send()
            .await
            .map_err(|e| AuthError::Connection(format!("twilio request error: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::Connection(format!(
                "account fetch failed: {status}"
            )));
        }

        let account: AccountResource = resp
            .json()
            .await
            .map_err(|e| AuthError::Connection(format!("twilio json error: {e}")))?;

        match parse_account_status(&account.status) {
            AccountStatus::Suspended | AccountStatus::Closed => Err(AuthError::Suspended),
            _ => {
                tracing::info!(account = %redact_sid(account_sid), "twilio credentials verified");
                Ok(Arc::new(TwilioAccount {
                    http: self.http.clone(),
                    base_url: self.base_url.clone(),
                    account_sid: account_sid.to_string(),
                    auth_token: auth_token.to_string(),
                }))
            }
        }
    }
}

/// One authenticated Twilio account.
pub struct TwilioAccount {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioAccount {
    fn url(&self, tail: &str) -> String {
        format!("{}/Accounts/{}/{tail}", self.base_url, self.account_sid)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("twilio request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "twilio error: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Transport(format!("twilio json error: {e}")))
    }
}

#[async_trait]
impl ProvisioningAccount for TwilioAccount {
    async fn balance(&self) -> Result<String> {
        let resource: BalanceResource = self.get_json(&self.url("Balance.json")).await?;
        Ok(resource.balance)
    }

    async fn account_status(&self) -> Result<AccountStatus> {
        let url = format!("{}/Accounts/{}.json", self.base_url, self.account_sid);
        let account: AccountResource = self.get_json(&url).await?;
        Ok(parse_account_status(&account.status))
    }

    async fn search_local(
        &self,
        area_code: &AreaCode,
        country: &str,
    ) -> Result<Vec<PhoneNumber>> {
        let url = format!(
            "{}?AreaCode={}&PageSize=50",
            self.url(&format!("AvailablePhoneNumbers/{country}/Local.json")),
            area_code
        );
        let page: AvailableNumbersPage = self.get_json(&url).await?;
        Ok(page
            .available_phone_numbers
            .into_iter()
            .map(|n| PhoneNumber(n.phone_number))
            .collect())
    }

    async fn purchase(
        &self,
        number: &PhoneNumber,
    ) -> std::result::Result<NumberSid, ProvisionError> {
        let resp = self
            .http
            .post(self.url("IncomingPhoneNumbers.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("PhoneNumber", number.0.as_str())])
            .send()
            .await
            .map_err(|e| ProvisionError::Other(format!("twilio request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let purchased: IncomingNumberResource = resp
            .json()
            .await
            .map_err(|e| ProvisionError::Other(format!("twilio json error: {e}")))?;
        Ok(NumberSid(purchased.sid))
    }

    async fn release(&self, sid: &NumberSid) -> std::result::Result<(), ProvisionError> {
        let resp = self
            .http
            .delete(self.url(&format!("IncomingPhoneNumbers/{sid}.json")))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| ProvisionError::Other(format!("twilio request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }

    async fn list_owned(&self) -> Result<Vec<OwnedNumber>> {
        let url = format!("{}?PageSize=100", self.url("IncomingPhoneNumbers.json"));
        let page: IncomingNumbersPage = self.get_json(&url).await?;
        Ok(page
            .incoming_phone_numbers
            .into_iter()
            .map(|n| OwnedNumber {
                number: PhoneNumber(n.phone_number),
                sid: NumberSid(n.sid),
            })
            .collect())
    }
}

/// Turn a failed API response into a classified provisioning error.
async fn api_error(resp: reqwest::Response) -> ProvisionError {
    let status = resp.status();
    match resp.json::<ApiError>().await {
        Ok(err) => classify_api_error(err.code, &err.message),
        Err(_) => ProvisionError::Other(format!("twilio error: {status}")),
    }
}

/// Map Twilio error codes (with message-substring fallbacks for proxied or
/// partial responses) onto the provisioning error taxonomy.
fn classify_api_error(code: Option<i64>, message: &str) -> ProvisionError {
    match code {
        Some(20002) => return ProvisionError::AccountSuspended,
        Some(20003) => return ProvisionError::Auth,
        Some(20005) => return ProvisionError::InsufficientBalance,
        Some(20009) => return ProvisionError::NumberUnavailable,
        Some(20429) => return ProvisionError::RateLimited,
        Some(21207) => return ProvisionError::AccountNotVerified,
        Some(21212) => return ProvisionError::InvalidNumber,
        Some(21215) => return ProvisionError::GeographicRestriction,
        Some(21220) => return ProvisionError::TrialAccount,
        Some(21422) => return ProvisionError::UnsupportedType,
        _ => {}
    }

    let msg = message.to_ascii_lowercase();
    if msg.contains("authenticate") {
        ProvisionError::Auth
    } else if msg.contains("no longer available") {
        ProvisionError::NumberUnavailable
    } else if msg.contains("rate limit") {
        ProvisionError::RateLimited
    } else if msg.contains("insufficient") || msg.contains("balance") {
        ProvisionError::InsufficientBalance
    } else if msg.contains("suspended") || msg.contains("disabled") {
        ProvisionError::AccountSuspended
    } else if msg.contains("trial") {
        ProvisionError::TrialAccount
    } else if msg.contains("geographic") {
        ProvisionError::GeographicRestriction
    } else if msg.contains("invalid") {
        ProvisionError::InvalidNumber
    } else {
        ProvisionError::Other(message.to_string())
    }
}

fn parse_account_status(status: &str) -> AccountStatus {
    match status {
        "active" => AccountStatus::Active,
        "suspended" => AccountStatus::Suspended,
        "closed" => AccountStatus::Closed,
        other => AccountStatus::Other(other.to_string()),
    }
}

/// First characters of the SID, enough to correlate log lines.
fn redact_sid(sid: &str) -> String {
    let head: String = sid.chars().take(10).collect();
    format!("{head}...")
}

// ---------- wire resources ----------

#[derive(Debug, Deserialize)]
struct AccountResource {
    status: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResource {
    balance: String,
}

#[derive(Debug, Deserialize)]
struct AvailableNumbersPage {
    #[serde(default)]
    available_phone_numbers: Vec<AvailableNumber>,
}

#[derive(Debug, Deserialize)]
struct AvailableNumber {
    phone_number: String,
}

#[derive(Debug, Deserialize)]
struct IncomingNumbersPage {
    #[serde(default)]
    incoming_phone_numbers: Vec<IncomingNumberResource>,
}

#[derive(Debug, Deserialize)]
struct IncomingNumberResource {
    sid: String,
    phone_number: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_taxonomy() {
        assert_eq!(classify_api_error(Some(20003), ""), ProvisionError::Auth);
        assert_eq!(
            classify_api_error(Some(20009), ""),
            ProvisionError::NumberUnavailable
        );
        assert_eq!(
            classify_api_error(Some(20429), ""),
            ProvisionError::RateLimited
        );
        assert_eq!(
            classify_api_error(Some(20005), ""),
            ProvisionError::InsufficientBalance
        );
        assert_eq!(
            classify_api_error(Some(20002), ""),
            ProvisionError::AccountSuspended
        );
        assert_eq!(
            classify_api_error(Some(21212), ""),
            ProvisionError::InvalidNumber
        );
        assert_eq!(
            classify_api_error(Some(21220), ""),
            ProvisionError::TrialAccount
        );
        assert_eq!(
            classify_api_error(Some(21215), ""),
            ProvisionError::GeographicRestriction
        );
        assert_eq!(
            classify_api_error(Some(21422), ""),
            ProvisionError::UnsupportedType
        );
        assert_eq!(
            classify_api_error(Some(21207), ""),
            ProvisionError::AccountNotVerified
        );
    }

    #[test]
    fn message_substrings_classify_when_code_is_unknown() {
        assert_eq!(
            classify_api_error(None, "Unable to authenticate"),
            ProvisionError::Auth
        );
        assert_eq!(
            classify_api_error(Some(99999), "The number is no longer available"),
            ProvisionError::NumberUnavailable
        );
        assert_eq!(
            classify_api_error(None, "Insufficient funds"),
            ProvisionError::InsufficientBalance
        );
        assert_eq!(
            classify_api_error(None, "something unexpected"),
            ProvisionError::Other("something unexpected".to_string())
        );
    }

    #[test]
    fn account_status_strings_parse() {
        assert_eq!(parse_account_status("active"), AccountStatus::Active);
        assert_eq!(parse_account_status("suspended"), AccountStatus::Suspended);
        assert_eq!(parse_account_status("closed"), AccountStatus::Closed);
        assert_eq!(
            parse_account_status("trial"),
            AccountStatus::Other("trial".to_string())
        );
    }

    #[test]
    fn available_numbers_page_parses() {
        let page: AvailableNumbersPage = serde_json::from_str(
            r#"{"available_phone_numbers":[{"phone_number":"+14165551234","locality":"Toronto"}]}"#,
        )
        .unwrap();
        assert_eq!(page.available_phone_numbers.len(), 1);
        assert_eq!(page.available_phone_numbers[0].phone_number, "+14165551234");
    }

    #[test]
    fn api_error_body_parses_without_code() {
        let err: ApiError =
            serde_json::from_str(r#"{"message":"Resource not found","status":404}"#).unwrap();
        assert_eq!(err.code, None);
        assert_eq!(err.message, "Resource not found");
    }
}

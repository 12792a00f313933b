use super::{
    ExchangeClient, ExchangeError, OkxNetwork, SubAccountBalance, WithdrawalChain,
    WithdrawalRequest,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::fmt;
use tracing::debug;

const BASE_URL: &str = "https://www.okx.com";

/// Funding account type in OKX transfer requests.
const FUNDING_ACCOUNT: &str = "6";
/// Sub-account to master account transfer.
const TRANSFER_SUB_TO_MASTER: &str = "2";
/// On-chain withdrawal destination.
const DEST_ON_CHAIN: &str = "4";

#[derive(Clone)]
pub struct OkxCredentials {
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl fmt::Debug for OkxCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkxCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"***REDACTED***")
            .field("passphrase", &"***REDACTED***")
            .finish()
    }
}

/// REST client for the OKX v5 API, limited to the funding endpoints.
pub struct OkxClient {
    credentials: OkxCredentials,
    base_url: String,
    http: Client,
}

impl OkxClient {
    pub fn new(credentials: OkxCredentials) -> Result<Self, ExchangeError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        Ok(Self {
            credentials,
            base_url: BASE_URL.to_string(),
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn timestamp() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// `base64(HMAC-SHA256(secret, timestamp + method + path + body))`
    pub fn sign(
        &self,
        timestamp: &str,
        method: &Method,
        request_path: &str,
        body: &str,
    ) -> Result<String, ExchangeError> {
        sign_payload(
            &self.credentials.secret,
            &format!("{}{}{}{}", timestamp, method.as_str(), request_path, body),
        )
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Vec<T>, ExchangeError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ExchangeError::Http(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let request_path = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        let timestamp = Self::timestamp();
        let signature = self.sign(&timestamp, &method, &request_path, &body)?;

        debug!("OKX {} {}", method, request_path);
        let mut builder = self
            .http
            .request(method, url)
            .header("OK-ACCESS-KEY", &self.credentials.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.credentials.passphrase)
            .header("Content-Type", "application/json");
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        parse_envelope(status.as_u16(), &text)
    }
}

fn sign_payload(secret: &str, payload: &str) -> Result<String, ExchangeError> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[derive(Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

/// Unwraps `{code, msg, data}`; a non-zero code becomes a classified error.
fn parse_envelope<T: DeserializeOwned>(status: u16, text: &str) -> Result<Vec<T>, ExchangeError> {
    let envelope: Envelope = serde_json::from_str(text)
        .map_err(|_| ExchangeError::Http(format!("HTTP {}: {}", status, text)))?;

    if envelope.code != "0" {
        // Batch-style endpoints answer code "1" and put the reason per item.
        if envelope.code == "1" {
            if let Some((code, msg)) = first_item_error(&envelope.data) {
                return Err(classify(&code, &msg));
            }
        }
        return Err(classify(&envelope.code, &envelope.msg));
    }

    match envelope.data {
        Value::Null => Ok(Vec::new()),
        data => serde_json::from_value(data)
            .map_err(|e| ExchangeError::Http(format!("Unexpected OKX payload: {}", e))),
    }
}

fn first_item_error(data: &Value) -> Option<(String, String)> {
    let item = data.as_array()?.first()?;
    let code = item.get("sCode")?.as_str()?.to_string();
    let msg = item
        .get("sMsg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, msg))
}

/// Maps OKX error codes onto the retry classes.
pub fn classify(code: &str, msg: &str) -> ExchangeError {
    let detail = format!("{} ({})", msg, code);
    match code {
        "58350" => ExchangeError::InsufficientFunds(detail),
        "50110" => ExchangeError::PermissionDenied(detail),
        "58203" | "58207" => ExchangeError::InvalidAddress(detail),
        "58200" | "58214" => ExchangeError::WithdrawalSuspended(detail),
        _ => ExchangeError::Unclassified {
            code: code.to_string(),
            message: msg.to_string(),
        },
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct SubAccountEntry {
    #[serde(rename = "subAcct")]
    sub_acct: String,
}

#[derive(Deserialize)]
struct SubBalanceEntry {
    ccy: String,
    #[serde(rename = "availBal", default)]
    avail_bal: String,
}

#[derive(Deserialize)]
struct CurrencyEntry {
    chain: String,
    #[serde(default)]
    fee: Option<String>,
    #[serde(rename = "minFee", default)]
    min_fee: Option<String>,
    #[serde(rename = "canWd", default = "default_true")]
    can_wd: bool,
}

impl CurrencyEntry {
    /// Withdrawal fee; older replies only carry `minFee`.
    fn withdrawal_fee(&self) -> String {
        self.fee
            .iter()
            .chain(self.min_fee.iter())
            .find(|f| !f.trim().is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct WithdrawalEntry {
    #[serde(rename = "wdId")]
    wd_id: String,
}

#[async_trait]
impl ExchangeClient for OkxClient {
    async fn sub_accounts(&self) -> Result<Vec<String>, ExchangeError> {
        let entries: Vec<SubAccountEntry> = self
            .request(Method::GET, "/api/v5/users/subaccount/list", &[], None)
            .await?;
        Ok(entries.into_iter().map(|e| e.sub_acct).collect())
    }

    async fn sub_account_balances(
        &self,
        sub_account: &str,
        currency: &str,
    ) -> Result<Vec<SubAccountBalance>, ExchangeError> {
        let entries: Vec<SubBalanceEntry> = self
            .request(
                Method::GET,
                "/api/v5/asset/subaccount/balances",
                &[("subAcct", sub_account), ("ccy", currency)],
                None,
            )
            .await?;

        Ok(entries
            .into_iter()
            .map(|e| SubAccountBalance {
                sub_account: sub_account.to_string(),
                currency: e.ccy,
                available: e.avail_bal,
            })
            .collect())
    }

    async fn transfer_to_master(&self, balance: &SubAccountBalance) -> Result<(), ExchangeError> {
        let body = json!({
            "ccy": balance.currency,
            "amt": balance.available,
            "from": FUNDING_ACCOUNT,
            "to": FUNDING_ACCOUNT,
            "type": TRANSFER_SUB_TO_MASTER,
            "subAcct": balance.sub_account,
        });
        let _: Vec<Value> = self
            .request(Method::POST, "/api/v5/asset/transfer", &[], Some(body))
            .await?;
        Ok(())
    }

    async fn withdrawal_chain(
        &self,
        currency: &str,
        network: OkxNetwork,
    ) -> Result<WithdrawalChain, ExchangeError> {
        let entries: Vec<CurrencyEntry> = self
            .request(
                Method::GET,
                "/api/v5/asset/currencies",
                &[("ccy", currency)],
                None,
            )
            .await?;

        let wanted = network.chain_id(currency);
        let entry = entries
            .into_iter()
            .find(|e| e.chain == wanted)
            .ok_or_else(|| ExchangeError::UnknownChain {
                currency: currency.to_string(),
                chain: wanted.clone(),
            })?;

        if !entry.can_wd {
            return Err(ExchangeError::WithdrawalSuspended(format!(
                "{} withdrawals are disabled",
                wanted
            )));
        }

        let fee = entry.withdrawal_fee();
        Ok(WithdrawalChain {
            chain: entry.chain,
            fee,
        })
    }

    async fn withdraw(&self, request: &WithdrawalRequest) -> Result<String, ExchangeError> {
        let body = json!({
            "ccy": request.currency,
            "amt": request.amount,
            "dest": DEST_ON_CHAIN,
            "toAddr": request.address,
            "fee": request.fee,
            "chain": request.chain,
        });
        let entries: Vec<WithdrawalEntry> = self
            .request(Method::POST, "/api/v5/asset/withdrawal", &[], Some(body))
            .await?;

        entries
            .into_iter()
            .next()
            .map(|e| e.wd_id)
            .ok_or_else(|| ExchangeError::Http("Withdrawal accepted without an id".to_string()))
    }
}

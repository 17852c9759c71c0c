// ==========================================
// 销售订单生成系统 - Odoo CRM 客户端
// ==========================================
// 协议: JSON-RPC 2.0 (POST <url>/jsonrpc)
// 会话: 首次查询时认证并缓存 uid（不在启动时连接）
// 查询: crm.lead search_read [id = 订单号]
// ==========================================

use crate::config::OdooSettings;
use crate::crm::{CrmError, CrmResult, CustomerDirectory};
use crate::domain::CustomerContact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// CRM 线索模型
const LEAD_MODEL: &str = "crm.lead";
/// 客户名字段
const FIELD_NAME: &str = "name";
/// 销售对接人字段
const FIELD_SALES_POC: &str = "x_studio_sales_poc_1";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: JsonRpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct JsonRpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl JsonRpcError {
    /// Odoo 把真实异常放在 data.message
    fn detail(&self) -> String {
        self.data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.message.clone())
    }
}

/// Odoo 字段值 → 文本
///
/// - 字符串: 去空白，空串视为缺失
/// - many2one `[id, "显示名"]`: 取显示名
/// - `false` / null / 其他: 缺失
pub fn text_field(record: &Value, key: &str) -> Option<String> {
    let value = record.get(key)?;
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.get(1).and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct OdooClient {
    settings: OdooSettings,
    client: reqwest::Client,
    uid: OnceCell<i64>,
    next_id: AtomicU64,
}

impl OdooClient {
    pub fn new(settings: OdooSettings) -> CrmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            settings,
            client,
            uid: OnceCell::new(),
            next_id: AtomicU64::new(1),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/jsonrpc", self.settings.url)
    }

    async fn call(&self, service: &str, method: &str, args: Value) -> CrmResult<Value> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: JsonRpcParams {
                service,
                method,
                args,
            },
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let url = self.endpoint();
        debug!(url = %url, service, method, "Odoo JSON-RPC 调用");

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| CrmError::Decode(e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(CrmError::Rpc {
                code: error.code,
                message: error.detail(),
            });
        }

        payload
            .result
            .ok_or_else(|| CrmError::Decode("响应缺少 result 字段".to_string()))
    }

    /// 获取会话 uid（首次调用时认证）
    async fn session_uid(&self) -> CrmResult<i64> {
        let uid = self
            .uid
            .get_or_try_init(|| async move {
                let s = &self.settings;
                let result = self
                    .call(
                        "common",
                        "authenticate",
                        json!([s.database, s.username, s.password, {}]),
                    )
                    .await?;

                // 认证失败时 Odoo 返回 false
                match result.as_i64() {
                    Some(uid) if uid > 0 => {
                        info!(uid, database = %s.database, "Odoo 认证成功");
                        Ok(uid)
                    }
                    _ => Err(CrmError::AuthenticationFailed {
                        database: s.database.clone(),
                        username: s.username.clone(),
                    }),
                }
            })
            .await?;
        Ok(*uid)
    }
}

#[async_trait]
impl CustomerDirectory for OdooClient {
    #[instrument(skip(self))]
    async fn fetch_customer_and_poc(&self, order_id: &str) -> CrmResult<CustomerContact> {
        let lead_id: i64 = order_id
            .trim()
            .parse()
            .map_err(|_| CrmError::InvalidOrderId(order_id.to_string()))?;

        let uid = self.session_uid().await?;
        let s = &self.settings;

        let result = self
            .call(
                "object",
                "execute_kw",
                json!([
                    s.database,
                    uid,
                    s.password,
                    LEAD_MODEL,
                    "search_read",
                    [[["id", "=", lead_id]]],
                    { "fields": ["id", FIELD_NAME, FIELD_SALES_POC], "limit": 1 }
                ]),
            )
            .await?;

        let records = result
            .as_array()
            .ok_or_else(|| CrmError::Decode("search_read 未返回数组".to_string()))?;

        let Some(lead) = records.first() else {
            info!(lead_id, "CRM 未找到订单对应线索，使用缺省客户信息");
            return Ok(CustomerContact::default());
        };

        let contact = CustomerContact {
            customer: text_field(lead, FIELD_NAME),
            poc: text_field(lead, FIELD_SALES_POC),
        };
        info!(
            lead_id,
            customer = contact.customer.as_deref().unwrap_or("-"),
            poc = contact.poc.as_deref().unwrap_or("-"),
            "CRM 客户信息获取完成"
        );
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_text_field_variants() {
        let lead = json!({
            "name": "  Sharma Residence ",
            "x_studio_sales_poc_1": [12, "Priya N"],
            "phone": false,
            "email_from": "",
        });

        assert_eq!(text_field(&lead, "name").as_deref(), Some("Sharma Residence"));
        assert_eq!(
            text_field(&lead, "x_studio_sales_poc_1").as_deref(),
            Some("Priya N")
        );
        assert_eq!(text_field(&lead, "phone"), None);
        assert_eq!(text_field(&lead, "email_from"), None);
        assert_eq!(text_field(&lead, "missing"), None);
    }

    #[test]
    fn test_rpc_error_detail_prefers_data_message() {
        let error: JsonRpcError = serde_json::from_value(json!({
            "code": 200,
            "message": "Odoo Server Error",
            "data": { "message": "Access Denied" }
        }))
        .unwrap();
        assert_eq!(error.detail(), "Access Denied");
    }

    #[tokio::test]
    async fn test_invalid_order_id_fails_before_network() {
        let client = OdooClient::new(OdooSettings {
            url: "http://127.0.0.1:9".to_string(),
            database: "db".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let err = client.fetch_customer_and_poc("12a").await.unwrap_err();
        assert!(matches!(err, CrmError::InvalidOrderId(id) if id == "12a"));
    }
}

// ==========================================
// 销售订单生成系统 - 静态客户目录
// ==========================================
// 用途: 离线运行（不连 CRM）与测试
// ==========================================

use crate::crm::{CrmResult, CustomerDirectory};
use crate::domain::CustomerContact;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    contacts: HashMap<String, CustomerContact>,
}

impl StaticDirectory {
    /// 空目录：所有订单都返回“未找到”
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_contact(
        mut self,
        order_id: impl Into<String>,
        customer: Option<&str>,
        poc: Option<&str>,
    ) -> Self {
        self.contacts.insert(
            order_id.into(),
            CustomerContact {
                customer: customer.map(str::to_string),
                poc: poc.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl CustomerDirectory for StaticDirectory {
    async fn fetch_customer_and_poc(&self, order_id: &str) -> CrmResult<CustomerContact> {
        Ok(self.contacts.get(order_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let directory = StaticDirectory::empty().with_contact("4521", Some("Acme Homes"), None);

        let found = directory.fetch_customer_and_poc("4521").await.unwrap();
        assert_eq!(found.customer.as_deref(), Some("Acme Homes"));
        assert_eq!(found.poc, None);

        let missing = directory.fetch_customer_and_poc("9").await.unwrap();
        assert_eq!(missing, CustomerContact::default());
    }
}

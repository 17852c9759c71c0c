// ==========================================
// 销售订单生成系统 - 配置层
// ==========================================
// 职责: 订单处理配置（config_kv 表）+ CRM 连接配置（环境变量）
// ==========================================

pub mod config_manager;
pub mod odoo_settings;
pub mod order_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use odoo_settings::{OdooSettings, SettingsError};
pub use order_config_trait::OrderConfigReader;

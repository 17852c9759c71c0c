// ==========================================
// 销售订单生成系统 - 订单处理配置读取 Trait
// ==========================================
// 职责: 定义订单处理所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::HeaderDefaults;
use crate::importer::SheetLayout;
use crate::repository::RepositoryResult;

// ==========================================
// OrderConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait OrderConfigReader: Send + Sync {
    /// 订单表版式
    ///
    /// # 默认值
    /// - header_row = 3, order_id_row = 2, order_id_col = 3（C2）
    fn get_sheet_layout(&self) -> RepositoryResult<SheetLayout>;

    /// 表头行缺省值
    ///
    /// # 默认值
    /// - Default Customer / Default POC / Consumer
    fn get_header_defaults(&self) -> RepositoryResult<HeaderDefaults>;

    /// 全部配置快照（JSON，用于批次日志）
    fn get_config_snapshot(&self) -> RepositoryResult<String>;
}

// ==========================================
// 销售订单生成系统 - 查询网关 Trait
// ==========================================
// 职责: 参考表只读精确查询（柜体 BOM / 颜色码 / 型号映射）
// 约束:
// - 未找到返回 Ok(None)，不报错
// - 存储层故障返回 Err，由上层整批失败
// - 重复键时取第一条（按写入顺序）
// ==========================================

use crate::domain::{CabinetRecord, ColourRecord};
use crate::repository::error::RepositoryResult;

pub trait LookupGateway: Send + Sync {
    /// 按柜体编码精确查找
    fn find_cabinet(&self, cabinet_code: &str) -> RepositoryResult<Option<CabinetRecord>>;

    /// 按饰面名称精确查找
    fn find_colour(&self, colour_name: &str) -> RepositoryResult<Option<ColourRecord>>;

    /// 按设计软件型号查找 ERP 产品编码
    fn find_mapped_code(&self, model_code: &str) -> RepositoryResult<Option<String>>;
}

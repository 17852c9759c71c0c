// ==========================================
// 销售订单生成系统 - 参考数据维护 API
// ==========================================
// 职责: 从 CSV 加载 cabinets / colorcode / code_raw 三张参考表
// 说明: 先完整解析全部文件，再在单个事务内写库；任一文件无效或任一写入失败则不改动参考表
// ==========================================

use crate::api::error::ApiResult;
use crate::db::open_sqlite_connection;
use crate::importer::ReferenceLoader;
use crate::repository::{ReferenceCounts, ReferenceLoad, ReferenceRepository, RepositoryError};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 参考数据来源文件
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceFiles<'a> {
    pub cabinets: Option<&'a Path>,
    pub colours: Option<&'a Path>,
    pub code_map: Option<&'a Path>,
}

pub struct ReferenceApi {
    repo: ReferenceRepository,
    loader: ReferenceLoader,
}

impl ReferenceApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        Ok(Self {
            repo: ReferenceRepository::from_connection(conn)?,
            loader: ReferenceLoader,
        })
    }

    /// 加载参考数据
    ///
    /// # 参数
    /// - files: 各表 CSV（未提供的表保持不变）
    /// - replace: true 时先清空三张表
    ///
    /// # 返回
    /// 加载后的各表行数
    pub fn load(&self, files: ReferenceFiles<'_>, replace: bool) -> ApiResult<ReferenceCounts> {
        let cabinets = files
            .cabinets
            .map(|p| self.loader.load_cabinets(p))
            .transpose()?;
        let colours = files
            .colours
            .map(|p| self.loader.load_colours(p))
            .transpose()?;
        let mappings = files
            .code_map
            .map(|p| self.loader.load_code_mappings(p))
            .transpose()?;

        self.repo.load_all(&ReferenceLoad {
            replace,
            cabinets: cabinets.as_deref(),
            colours: colours.as_deref(),
            code_mappings: mappings.as_deref(),
        })?;

        let counts = self.repo.counts()?;
        info!(
            cabinets = counts.cabinets,
            colours = counts.colours,
            code_mappings = counts.code_mappings,
            replace,
            "参考数据加载完成"
        );
        Ok(counts)
    }

    pub fn counts(&self) -> ApiResult<ReferenceCounts> {
        Ok(self.repo.counts()?)
    }
}

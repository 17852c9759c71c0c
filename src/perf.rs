// ==========================================
// 销售订单生成系统 - 参考表查询计量
// ==========================================
// 计量对象: cabinets / colorcode / code_raw 三类单键查询
// 输出: 批次结束时一条 perf 日志（行数、各表查询数、行均查询数、慢查询数）
// 开关: SO_GEN_SLOW_LOOKUP_MS 慢查询阈值（毫秒，0 关闭慢查询告警）
// ==========================================

use once_cell::sync::Lazy;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// 慢查询阈值环境变量
pub const SLOW_LOOKUP_ENV: &str = "SO_GEN_SLOW_LOOKUP_MS";

static SLOW_LOOKUP_MS: Lazy<u64> = Lazy::new(|| {
    std::env::var(SLOW_LOOKUP_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(50)
});

thread_local! {
    static LOOKUPS: Cell<LookupStats> = const { Cell::new(LookupStats::ZERO) };
}

/// 被计量的参考表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Cabinets,
    Colours,
    CodeMap,
}

impl LookupTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            LookupTable::Cabinets => "cabinets",
            LookupTable::Colours => "colorcode",
            LookupTable::CodeMap => "code_raw",
        }
    }
}

/// 查询计数（当前线程累计值或区间差值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupStats {
    pub cabinets: u64,
    pub colours: u64,
    pub code_map: u64,
    pub slow: u64,
}

impl LookupStats {
    const ZERO: LookupStats = LookupStats {
        cabinets: 0,
        colours: 0,
        code_map: 0,
        slow: 0,
    };

    pub fn total(&self) -> u64 {
        self.cabinets + self.colours + self.code_map
    }

    /// 行均查询数（0 行时为 0）
    pub fn per_row(&self, rows: usize) -> f64 {
        if rows == 0 {
            return 0.0;
        }
        self.total() as f64 / rows as f64
    }

    fn since(&self, base: &LookupStats) -> LookupStats {
        LookupStats {
            cabinets: self.cabinets.saturating_sub(base.cabinets),
            colours: self.colours.saturating_sub(base.colours),
            code_map: self.code_map.saturating_sub(base.code_map),
            slow: self.slow.saturating_sub(base.slow),
        }
    }
}

fn record_with_threshold(table: LookupTable, elapsed: Duration, threshold_ms: u64) {
    let ms = elapsed.as_millis() as u64;
    let slow = threshold_ms > 0 && ms >= threshold_ms;
    if slow {
        tracing::warn!(
            target: "slow_lookup",
            table = table.table_name(),
            duration_ms = ms,
            "参考表查询过慢"
        );
    }

    LOOKUPS.with(|cell| {
        let mut stats = cell.get();
        match table {
            LookupTable::Cabinets => stats.cabinets += 1,
            LookupTable::Colours => stats.colours += 1,
            LookupTable::CodeMap => stats.code_map += 1,
        }
        if slow {
            stats.slow += 1;
        }
        cell.set(stats);
    });
}

/// 记录一次参考表查询（由 LookupGateway 的 SQLite 实现调用）
pub fn record_lookup(table: LookupTable, elapsed: Duration) {
    record_with_threshold(table, elapsed, *SLOW_LOOKUP_MS);
}

/// 批次计量 Guard：Drop 时输出本批次的查询统计
///
/// 批次解析为同步调用，查询与 Guard 位于同一线程
pub struct BatchMeter {
    op: &'static str,
    rows: usize,
    start: Instant,
    base: LookupStats,
}

impl BatchMeter {
    pub fn start(op: &'static str, rows: usize) -> Self {
        Self {
            op,
            rows,
            start: Instant::now(),
            base: LOOKUPS.with(Cell::get),
        }
    }

    /// 自 start 以来的查询统计
    pub fn stats(&self) -> LookupStats {
        LOOKUPS.with(Cell::get).since(&self.base)
    }
}

impl Drop for BatchMeter {
    fn drop(&mut self) {
        let stats = self.stats();
        tracing::info!(
            target: "perf",
            op = self.op,
            rows = self.rows,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            cabinet_lookups = stats.cabinets,
            colour_lookups = stats.colours,
            code_map_lookups = stats.code_map,
            lookups_per_row = format!("{:.2}", stats.per_row(self.rows)),
            slow_lookups = stats.slow,
            "done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_counts_only_its_own_window() {
        record_lookup(LookupTable::Cabinets, Duration::ZERO);

        let meter = BatchMeter::start("test", 2);
        record_lookup(LookupTable::Cabinets, Duration::ZERO);
        record_lookup(LookupTable::Colours, Duration::ZERO);
        record_lookup(LookupTable::CodeMap, Duration::ZERO);

        let stats = meter.stats();
        assert_eq!(stats.cabinets, 1);
        assert_eq!(stats.colours, 1);
        assert_eq!(stats.code_map, 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.per_row(2), 1.5);
    }

    #[test]
    fn test_slow_lookup_threshold() {
        let meter = BatchMeter::start("test", 1);
        record_with_threshold(LookupTable::Colours, Duration::from_millis(80), 50);
        record_with_threshold(LookupTable::Colours, Duration::from_millis(10), 50);
        record_with_threshold(LookupTable::Colours, Duration::from_millis(500), 0);

        let stats = meter.stats();
        assert_eq!(stats.colours, 3);
        assert_eq!(stats.slow, 1);
    }

    #[test]
    fn test_per_row_with_no_rows() {
        assert_eq!(LookupStats::default().per_row(0), 0.0);
    }
}

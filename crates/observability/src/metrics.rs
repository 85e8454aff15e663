//! 批量查询指标收集模块
//!
//! 基于每个 QueryOutcome 记录和统计运行指标。

use std::collections::BTreeMap;

use contracts::{Outcome, QueryOutcome, RunSummary};
use metrics::{counter, gauge, histogram};

/// 记录单个查询结果
///
/// 每个工作单元完成时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_query_outcome;
///
/// let outcome = QueryOutcome { .. };
/// record_query_outcome(&outcome);
/// ```
pub fn record_query_outcome(outcome: &QueryOutcome) {
    match &outcome.outcome {
        Outcome::Success(result) => {
            counter!("batch_search_queries_total", "status" => "success").increment(1);
            histogram!("batch_search_total_hits").record(result.total_hits as f64);
        }
        Outcome::Failure(error) => {
            counter!("batch_search_queries_total", "status" => "failure").increment(1);
            counter!("batch_search_failures_total", "kind" => error.kind()).increment(1);
        }
    }

    // 调用耗时
    histogram!("batch_search_call_latency_ms").record(outcome.latency.as_secs_f64() * 1000.0);
}

/// 工作单元开始调用，在途请求数 +1
pub fn record_unit_entered() {
    gauge!("batch_search_in_flight").increment(1.0);
}

/// 工作单元结束（包括取消与 panic），在途请求数 -1
pub fn record_unit_left() {
    gauge!("batch_search_in_flight").decrement(1.0);
}

/// 记录整次运行结束
pub fn record_run_finished(summary: &RunSummary) {
    counter!("batch_search_runs_total").increment(1);
    gauge!("batch_search_last_run_success").set(summary.success_count() as f64);
    gauge!("batch_search_last_run_failure").set(summary.failure_count() as f64);
    histogram!("batch_search_run_duration_ms").record(summary.elapsed().as_secs_f64() * 1000.0);
}

/// 运行指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    /// 查询总数
    pub total_queries: u64,

    /// 成功数
    pub successes: u64,

    /// 失败数
    pub failures: u64,

    /// 按失败类型计数
    pub failures_by_kind: BTreeMap<&'static str, u64>,

    /// 调用耗时统计 (毫秒)
    pub latency_stats: RunningStats,

    /// 成功结果命中数统计
    pub hits_stats: RunningStats,
}

impl RunMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从完整运行结果构建
    pub fn from_summary(summary: &RunSummary) -> Self {
        let mut aggregator = Self::new();
        for outcome in summary.outcomes() {
            aggregator.update(outcome);
        }
        aggregator
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: &QueryOutcome) {
        self.total_queries += 1;

        match &outcome.outcome {
            Outcome::Success(result) => {
                self.successes += 1;
                self.hits_stats.push(result.total_hits as f64);
                self.latency_stats
                    .push(outcome.latency.as_secs_f64() * 1000.0);
            }
            Outcome::Failure(error) => {
                self.failures += 1;
                *self.failures_by_kind.entry(error.kind()).or_insert(0) += 1;
                // 未执行的单元没有耗时
                if !outcome.latency.is_zero() {
                    self.latency_stats
                        .push(outcome.latency.as_secs_f64() * 1000.0);
                }
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_queries: self.total_queries,
            successes: self.successes,
            failures: self.failures,
            failure_rate: if self.total_queries > 0 {
                self.failures as f64 / self.total_queries as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            total_hits: StatsSummary::from(&self.hits_stats),
            failures_by_kind: self.failures_by_kind.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_queries: u64,
    pub successes: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub total_hits: StatsSummary,
    pub failures_by_kind: BTreeMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Batch Search Summary ===")?;
        writeln!(f, "Total queries: {}", self.total_queries)?;
        writeln!(f, "Successful: {}", self.successes)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failures, self.failure_rate
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Total hits: {}", self.total_hits)?;

        if !self.failures_by_kind.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in &self.failures_by_kind {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ErrorDetail, SearchResult};
    use std::time::Duration;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = RunMetricsAggregator::new();

        aggregator.update(&QueryOutcome {
            position: 0,
            outcome: Outcome::Success(SearchResult {
                total_hits: 4,
                ..Default::default()
            }),
            latency: Duration::from_millis(20),
        });
        aggregator.update(&QueryOutcome {
            position: 1,
            outcome: Outcome::Failure(ErrorDetail::status(500, "boom")),
            latency: Duration::from_millis(40),
        });
        aggregator.update(&QueryOutcome::not_run(2, ErrorDetail::Cancelled));

        assert_eq!(aggregator.total_queries, 3);
        assert_eq!(aggregator.successes, 1);
        assert_eq!(aggregator.failures, 2);
        assert_eq!(aggregator.failures_by_kind.get("status"), Some(&1));
        assert_eq!(aggregator.failures_by_kind.get("cancelled"), Some(&1));
        // The never-run unit contributes no latency sample
        assert_eq!(aggregator.latency_stats.count(), 2);
        assert!((aggregator.latency_stats.mean() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            total_queries: 100,
            successes: 95,
            failures: 5,
            failure_rate: 5.0,
            latency_ms: StatsSummary {
                count: 100,
                min: 2.0,
                max: 80.0,
                mean: 12.0,
                std_dev: 4.0,
            },
            total_hits: StatsSummary::default(),
            failures_by_kind: BTreeMap::from([("timeout", 5)]),
        };

        let output = format!("{}", summary);
        assert!(output.contains("Total queries: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("timeout: 5"));
    }
}

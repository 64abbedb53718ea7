//! 会话指标收集模块
//!
//! Prometheus counters for actor lifecycle and debug drawing, plus an
//! in-memory aggregator for end-of-run summaries.

use contracts::WorldTick;
use metrics::{counter, gauge, histogram};

/// 记录 actor spawn 成功
pub fn record_actor_spawned(blueprint: &str) {
    counter!(
        "carla_utils_actors_spawned_total",
        "blueprint" => blueprint.to_string()
    )
    .increment(1);
}

/// 记录 spawn 被仿真器拒绝 (碰撞等)
pub fn record_spawn_refused(blueprint: &str) {
    counter!(
        "carla_utils_spawn_refused_total",
        "blueprint" => blueprint.to_string()
    )
    .increment(1);
}

/// 记录 actor 销毁
pub fn record_actor_destroyed() {
    counter!("carla_utils_actors_destroyed_total").increment(1);
}

/// 记录 debug 绘制
pub fn record_debug_draw(shape: &str) {
    counter!(
        "carla_utils_debug_draws_total",
        "shape" => shape.to_string()
    )
    .increment(1);
}

/// 记录仿真 tick
pub fn record_tick(tick: &WorldTick) {
    counter!("carla_utils_ticks_total").increment(1);
    gauge!("carla_utils_last_frame").set(tick.frame as f64);
    histogram!("carla_utils_tick_delta_ms").record(tick.delta_seconds * 1000.0);
}

/// 记录当前存活的已 spawn actor 数量
pub fn record_live_actors(count: usize) {
    gauge!("carla_utils_live_actors").set(count as f64);
}

/// 会话指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    /// spawn 成功数
    pub spawned: u64,

    /// spawn 被拒绝数
    pub refused: u64,

    /// 按距离移除的 actor 数
    pub removed: u64,

    /// teardown 销毁数
    pub destroyed: u64,

    /// tick 数
    pub ticks: u64,

    /// 最后一帧
    pub last_frame: Option<u64>,

    /// tick 间隔统计 (毫秒)
    pub tick_delta_stats: RunningStats,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_succeeded(&mut self) {
        self.spawned += 1;
    }

    pub fn spawn_refused(&mut self) {
        self.refused += 1;
    }

    pub fn actors_removed(&mut self, count: usize) {
        self.removed += count as u64;
    }

    pub fn actors_destroyed(&mut self, count: usize) {
        self.destroyed += count as u64;
    }

    /// 更新 tick 统计并导出到 Prometheus
    pub fn tick(&mut self, tick: &WorldTick) {
        self.ticks += 1;
        self.last_frame = Some(tick.frame);
        self.tick_delta_stats.push(tick.delta_seconds * 1000.0);
        record_tick(tick);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> SessionSummary {
        let attempts = self.spawned + self.refused;
        SessionSummary {
            spawned: self.spawned,
            refused: self.refused,
            removed: self.removed,
            destroyed: self.destroyed,
            ticks: self.ticks,
            last_frame: self.last_frame,
            refusal_rate: if attempts > 0 {
                self.refused as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            tick_delta_ms: StatsSummary::from(&self.tick_delta_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub spawned: u64,
    pub refused: u64,
    pub removed: u64,
    pub destroyed: u64,
    pub ticks: u64,
    pub last_frame: Option<u64>,
    pub refusal_rate: f64,
    pub tick_delta_ms: StatsSummary,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(
            f,
            "Spawned actors: {} (refused {}, {:.2}%)",
            self.spawned, self.refused, self.refusal_rate
        )?;
        writeln!(f, "Removed by distance: {}", self.removed)?;
        writeln!(f, "Destroyed at teardown: {}", self.destroyed)?;
        match self.last_frame {
            Some(frame) => writeln!(f, "Ticks: {} (last frame {})", self.ticks, frame)?,
            None => writeln!(f, "Ticks: {}", self.ticks)?,
        }
        writeln!(f, "Tick delta (ms): {}", self.tick_delta_ms)?;
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

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

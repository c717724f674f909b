//! 后端仿真器
//!
//! 有界并发的执行后端模型：trial 提交后进入某个并发槽位（running），
//! 或在 FIFO 队列中等待；每次 `update()` 把已到期的 running trial 移入 completed，
//! 并用队首 trial 一对一地补上空出的槽位。

use std::collections::HashMap;
use std::fmt::Write as _;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use super::error::SimError;
use super::options::BackendSimulatorOptions;
use super::partition::{Partition, Partitions};
use super::state::BackendSimulatorState;
use super::status::{JobStatus, SimStatus};
use super::trial::{SimTrial, TrialIndex};
use crate::sim::Clock;
use crate::trace::{TraceEvent, TraceEventKind, TraceLogger};

/// 一次 `update()` 的结果汇总。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UpdateSummary {
    /// 本次 update 使用的时钟读数
    pub time: f64,
    /// 新完成的 trial 数
    pub completed: usize,
    /// 从 queued 晋升的 trial 数
    pub promoted: usize,
    /// 产生了新完成 trial 的轮次数
    pub passes: usize,
}

/// 带并发上限和 FIFO 队列的后端仿真器。
#[derive(Debug)]
pub struct BackendSimulator {
    options: BackendSimulatorOptions,
    clock: Clock,
    rng: ChaCha8Rng,
    partitions: Partitions,
    verbose_logging: bool,
    init_state: BackendSimulatorState,
    trace: Option<TraceLogger>,
}

impl BackendSimulator {
    /// 以空分区构造。失败抽样的种子取 `options.seed`，缺省时随机生成。
    pub fn new(options: BackendSimulatorOptions) -> Result<Self, SimError> {
        Self::with_partitions(options, Partitions::default(), true)
    }

    /// 以预置分区构造（主要用于测试特定的初始状态）。
    pub fn with_partitions(
        options: BackendSimulatorOptions,
        partitions: Partitions,
        verbose_logging: bool,
    ) -> Result<Self, SimError> {
        let seed = options.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Self::with_rng(options, partitions, verbose_logging, rng)
    }

    /// 使用调用方提供的随机数生成器构造，`options.seed` 被忽略。
    ///
    /// 构造时的状态会被保存下来，供 [`BackendSimulator::reset`] 使用。
    pub fn with_rng(
        options: BackendSimulatorOptions,
        partitions: Partitions,
        verbose_logging: bool,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimError> {
        options.validate()?;
        validate_partitions(&partitions)?;

        let init_state = BackendSimulatorState {
            options: options.clone(),
            verbose_logging,
            rng: rng.clone(),
            queued: partitions.queued.iter().copied().collect(),
            running: partitions.running.clone(),
            failed: partitions.failed.clone(),
            completed: partitions.completed.clone(),
        };
        let sim = Self {
            clock: Clock::from_initial(options.internal_clock),
            options,
            rng,
            partitions,
            verbose_logging,
            init_state,
            trace: None,
        };

        debug!(
            max_concurrency = sim.options.max_concurrency,
            time_scaling = sim.options.time_scaling,
            failure_rate = sim.options.failure_rate,
            internal_clock = ?sim.options.internal_clock,
            trials = sim.partitions.len(),
            "backend simulator created"
        );
        Ok(sim)
    }

    /// 从快照构造新的仿真器。快照中的记录被复制，两者互不影响。
    pub fn from_state(state: &BackendSimulatorState) -> Result<Self, SimError> {
        let partitions = Partitions::new(
            state.queued.clone(),
            state.running.clone(),
            state.failed.clone(),
            state.completed.clone(),
        );
        Self::with_rng(
            state.options.clone(),
            partitions,
            state.verbose_logging,
            state.rng.clone(),
        )
    }

    /// 构造时的配置；`internal_clock` 为初值，当前读数见 [`BackendSimulator::time`]。
    pub fn options(&self) -> &BackendSimulatorOptions {
        &self.options
    }

    pub fn partitions(&self) -> &Partitions {
        &self.partitions
    }

    pub fn num_queued(&self) -> usize {
        self.partitions.queued.len()
    }

    pub fn num_running(&self) -> usize {
        self.partitions.running.len()
    }

    pub fn num_failed(&self) -> usize {
        self.partitions.failed.len()
    }

    pub fn num_completed(&self) -> usize {
        self.partitions.completed.len()
    }

    /// 没有排队也没有运行中的 trial。
    pub fn is_idle(&self) -> bool {
        self.partitions.queued.is_empty() && self.partitions.running.is_empty()
    }

    pub fn use_internal_clock(&self) -> bool {
        self.clock.is_internal()
    }

    /// 当前时间
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn verbose_logging(&self) -> bool {
        self.verbose_logging
    }

    pub fn set_verbose_logging(&mut self, verbose: bool) {
        self.verbose_logging = verbose;
    }

    /// 开始记录状态迁移事件。记录不属于快照，`reset()` 也不会清空它。
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(TraceLogger::default);
    }

    pub fn trace(&self) -> Option<&TraceLogger> {
        self.trace.as_ref()
    }

    pub fn take_trace(&mut self) -> Option<TraceLogger> {
        self.trace.take()
    }

    /// 提交一个 trial。
    ///
    /// 仿真时长为 `runtime / time_scaling`。按 `failure_rate` 抽样决定是否立即失败；
    /// 否则有空闲槽位时直接运行，没有时进入队尾。返回 trial 落入的分区。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run_trial(
        &mut self,
        trial_index: TrialIndex,
        runtime: f64,
    ) -> Result<Partition, SimError> {
        if !(runtime.is_finite() && runtime >= 0.0) {
            return Err(SimError::InvalidRuntime {
                trial_index,
                runtime,
            });
        }
        if let Some(partition) = self.partitions.locate(trial_index) {
            return Err(SimError::DuplicateTrial {
                trial_index,
                partition,
            });
        }

        let sim_runtime = runtime / self.options.time_scaling;
        let now = self.time();
        let trial = SimTrial::new(trial_index, sim_runtime);

        // failure_rate 为 0 时不抽样
        let failure_rate = self.options.failure_rate;
        if failure_rate > 0.0 && self.rng.gen_bool(failure_rate) {
            self.partitions.failed.push(trial.with_start_time(now));
            self.record(now, trial_index, TraceEventKind::Failed);
            debug!(%trial_index, now, sim_runtime, "trial failed at submission");
            return Ok(Partition::Failed);
        }

        if self.partitions.running.len() < self.options.max_concurrency {
            self.partitions
                .running
                .push(trial.with_start_time(now).with_queued_time(now));
            self.record(now, trial_index, TraceEventKind::Started { sim_runtime });
            debug!(
                %trial_index,
                now,
                sim_runtime,
                running = self.num_running(),
                "trial started"
            );
            Ok(Partition::Running)
        } else {
            self.partitions.queued.push_back(trial.with_queued_time(now));
            let queue_len = self.partitions.queued.len();
            self.record(
                now,
                trial_index,
                TraceEventKind::Queued {
                    sim_runtime,
                    queue_len,
                },
            );
            debug!(%trial_index, now, sim_runtime, queue_len, "trial queued");
            Ok(Partition::Queued)
        }
    }

    /// 推进仿真：内部时钟先加 1，然后在当前时刻完成到期 trial 并补位，直到稳定。
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self) -> UpdateSummary {
        self.clock.advance();
        let now = self.clock.time();
        let summary = self.catch_up(now);

        let report = self.describe_at(now);
        if self.verbose_logging {
            info!("{report}");
        } else {
            debug!("{report}");
        }
        summary
    }

    /// 在时刻 `now` 反复执行「完成 -> 补位」，直到某一轮没有新完成的 trial。
    ///
    /// 每轮完成的 trial 都永久离开 running，因此轮数不超过 trial 总数。
    pub(crate) fn catch_up(&mut self, now: f64) -> UpdateSummary {
        let mut summary = UpdateSummary {
            time: now,
            ..UpdateSummary::default()
        };

        loop {
            let first_new = self.partitions.completed.len();
            let deadlines = self.partitions.complete_overdue(now);
            if deadlines.is_empty() {
                break;
            }
            summary.passes += 1;
            summary.completed += deadlines.len();
            trace!(
                pass = summary.passes,
                completed = deadlines.len(),
                queued = self.partitions.queued.len(),
                "completion pass"
            );

            if let Some(log) = self.trace.as_mut() {
                for done in &self.partitions.completed[first_new..] {
                    let start = done
                        .sim_start_time
                        .expect("completed trial must have a start time");
                    log.push(TraceEvent {
                        t: now,
                        trial_index: done.trial_index,
                        kind: TraceEventKind::Completed {
                            start,
                            deadline: start + done.sim_runtime,
                        },
                    });
                }
            }

            // 每个完成的 trial 最多放行一个排队 trial，即使名义上还有空闲槽位
            for deadline in deadlines {
                let Some(mut next) = self.partitions.queued.pop_front() else {
                    break;
                };
                let start = if self.options.use_update_as_start_time {
                    now
                } else {
                    deadline
                };
                next.sim_start_time = Some(start);
                let waited = next.sim_queued_time.map(|q| start - q);
                self.record(
                    now,
                    next.trial_index,
                    TraceEventKind::Promoted { start, waited },
                );
                self.partitions.running.push(next);
                summary.promoted += 1;
            }
        }

        summary
    }

    /// 恢复到构造时的状态，丢弃之后的全部修改。
    pub fn reset(&mut self) {
        let init = &self.init_state;
        self.options = init.options.clone();
        self.clock = Clock::from_initial(init.options.internal_clock);
        self.rng = init.rng.clone();
        self.verbose_logging = init.verbose_logging;
        self.partitions = Partitions::new(
            init.queued.clone(),
            init.running.clone(),
            init.failed.clone(),
            init.completed.clone(),
        );
        debug!(trials = self.partitions.len(), "backend simulator reset");
    }

    /// 当前状态的独立副本。
    pub fn state(&self) -> BackendSimulatorState {
        let options = BackendSimulatorOptions {
            internal_clock: self.clock.internal(),
            ..self.options.clone()
        };
        BackendSimulatorState {
            options,
            verbose_logging: self.verbose_logging,
            rng: self.rng.clone(),
            queued: self.partitions.queued.iter().copied().collect(),
            running: self.partitions.running.clone(),
            failed: self.partitions.failed.clone(),
            completed: self.partitions.completed.clone(),
        }
    }

    /// 各分区的 trial index，以及每个 running trial 的剩余时间（可能为负）。
    pub fn status(&self) -> SimStatus {
        let now = self.time();
        let indices = |trials: &[SimTrial]| -> Vec<TrialIndex> {
            trials.iter().map(|t| t.trial_index).collect()
        };
        SimStatus {
            queued: self.partitions.queued.iter().map(|t| t.trial_index).collect(),
            running: indices(&self.partitions.running),
            failed: indices(&self.partitions.failed),
            time_remaining: self
                .partitions
                .running
                .iter()
                .map(|t| t.deadline().expect("running trial must have a start time") - now)
                .collect(),
            completed: indices(&self.partitions.completed),
        }
    }

    /// trial 所在的分区；未知的 trial 返回 `None`。
    pub fn lookup_partition(&self, trial_index: TrialIndex) -> Option<Partition> {
        self.partitions.locate(trial_index)
    }

    /// 把 trial 所在分区映射到调用方的状态枚举（queued 对应 staged）。
    pub fn lookup<S: JobStatus>(&self, trial_index: TrialIndex) -> Option<S> {
        self.lookup_partition(trial_index).map(S::from_partition)
    }

    /// 多行诊断文本：当前时刻与四个分区的内容。
    pub fn describe(&self) -> String {
        self.describe_at(self.time())
    }

    fn describe_at(&self, now: f64) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "-----------");
        let _ = writeln!(out, "Updated backend simulator state (time = {now}):");
        let sections: [(&str, Vec<&SimTrial>); 4] = [
            ("Queued", self.partitions.queued.iter().collect()),
            ("Running", self.partitions.running.iter().collect()),
            ("Failed", self.partitions.failed.iter().collect()),
            ("Completed", self.partitions.completed.iter().collect()),
        ];
        for (name, trials) in sections {
            let _ = writeln!(out, "** {name}:");
            for t in trials {
                let _ = writeln!(out, "{t}");
            }
        }
        let _ = writeln!(out, "-----------");
        out
    }

    fn record(&mut self, t: f64, trial_index: TrialIndex, kind: TraceEventKind) {
        if let Some(log) = self.trace.as_mut() {
            log.push(TraceEvent {
                t,
                trial_index,
                kind,
            });
        }
    }
}

/// 预置分区必须两两不相交，running 中的记录必须有开始时间。
fn validate_partitions(partitions: &Partitions) -> Result<(), SimError> {
    let mut seen: HashMap<TrialIndex, Partition> = HashMap::with_capacity(partitions.len());
    let groups: [(Partition, Vec<&SimTrial>); 4] = [
        (Partition::Queued, partitions.queued.iter().collect()),
        (Partition::Running, partitions.running.iter().collect()),
        (Partition::Completed, partitions.completed.iter().collect()),
        (Partition::Failed, partitions.failed.iter().collect()),
    ];
    for (partition, trials) in groups {
        for t in trials {
            if !(t.sim_runtime.is_finite() && t.sim_runtime >= 0.0) {
                return Err(SimError::InvalidRuntime {
                    trial_index: t.trial_index,
                    runtime: t.sim_runtime,
                });
            }
            if partition == Partition::Running && t.sim_start_time.is_none() {
                return Err(SimError::MissingStartTime {
                    trial_index: t.trial_index,
                });
            }
            if let Some(&first) = seen.get(&t.trial_index) {
                return Err(SimError::DuplicateTrial {
                    trial_index: t.trial_index,
                    partition: first,
                });
            }
            seen.insert(t.trial_index, partition);
        }
    }
    Ok(())
}

//! 后端仿真 CLI
//!
//! 按 trial plan 提交 trial，反复调用 `update()` 直到全部结束。

use backend_sim_rs::backend::{
    BackendSimulator, BackendSimulatorOptions, BackendSimulatorState, Partitions, TrialPlan,
};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "backend-sim",
    about = "Simulate a bounded-concurrency execution backend with a FIFO queue"
)]
struct Args {
    /// 最大并发 trial 数
    #[arg(long, default_value_t = 1)]
    max_concurrency: usize,

    /// 运行时长缩放因子（仿真时长 = runtime / time_scaling）
    #[arg(long, default_value_t = 1.0)]
    time_scaling: f64,

    /// 每次提交的失败概率
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,

    /// 失败抽样的随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 内部时钟初值
    #[arg(long, default_value_t = 0.0)]
    internal_clock: f64,

    /// 使用墙钟而不是内部时钟
    #[arg(long)]
    wall_clock: bool,

    /// 墙钟模式下两次 update 之间的间隔（毫秒）
    #[arg(long, default_value_t = 10)]
    poll_ms: u64,

    /// 晋升时以 update 时刻作为开始时间
    #[arg(long)]
    use_update_as_start_time: bool,

    /// Path to a trial plan JSON
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Without --plan: number of trials to submit up front
    #[arg(long, default_value_t = 0)]
    trials: u64,

    /// Without --plan: runtime of each generated trial
    #[arg(long, default_value_t = 1.0)]
    runtime: f64,

    /// Resume from a state JSON written by --state-json
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the final simulator state as JSON
    #[arg(long)]
    state_json: Option<PathBuf>,

    /// Write per-trial transition events as JSON
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// Stop after this many updates even if trials remain
    #[arg(long, default_value_t = 10_000)]
    max_updates: u64,

    /// 关闭日志输出
    #[arg(long)]
    quiet: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("backend_sim: {msg}");
    exit(2);
}

fn build_simulator(args: &Args) -> BackendSimulator {
    if let Some(path) = &args.resume {
        let raw = fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("read {}: {e}", path.display())));
        let state = BackendSimulatorState::from_json(&raw)
            .unwrap_or_else(|e| fail(format!("parse {}: {e}", path.display())));
        return BackendSimulator::from_state(&state).unwrap_or_else(|e| fail(e));
    }

    let options = BackendSimulatorOptions {
        max_concurrency: args.max_concurrency,
        time_scaling: args.time_scaling,
        failure_rate: args.failure_rate,
        internal_clock: (!args.wall_clock).then_some(args.internal_clock),
        use_update_as_start_time: args.use_update_as_start_time,
        seed: args.seed,
    };
    BackendSimulator::with_partitions(options, Partitions::default(), !args.quiet)
        .unwrap_or_else(|e| fail(e))
}

fn load_plan(args: &Args) -> TrialPlan {
    match &args.plan {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("read {}: {e}", path.display())));
            serde_json::from_str(&raw)
                .unwrap_or_else(|e| fail(format!("parse {}: {e}", path.display())))
        }
        None => TrialPlan::uniform(args.trials, args.runtime),
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut sim = build_simulator(&args);
    if args.trace_json.is_some() {
        sim.enable_trace();
    }
    let plan = load_plan(&args);
    let last_submission = plan.last_submission();

    let mut updates = 0u64;
    loop {
        for planned in plan.due_at(updates) {
            sim.run_trial(planned.trial_index, planned.runtime)
                .unwrap_or_else(|e| fail(e));
        }
        if (sim.is_idle() && updates >= last_submission) || updates >= args.max_updates {
            break;
        }
        if !sim.use_internal_clock() {
            std::thread::sleep(Duration::from_millis(args.poll_ms));
        }
        sim.update();
        updates += 1;
    }

    if let Some(path) = &args.state_json {
        let raw = sim.state().to_json().expect("serialize state");
        fs::write(path, raw).unwrap_or_else(|e| fail(format!("write {}: {e}", path.display())));
    }
    if let Some(path) = &args.trace_json {
        let trace = sim.take_trace().unwrap_or_default();
        let raw = trace.to_json().expect("serialize trace");
        fs::write(path, raw).unwrap_or_else(|e| fail(format!("write {}: {e}", path.display())));
    }

    println!(
        "done @ t={} updates={} queued={} running={} failed={} completed={}",
        sim.time(),
        updates,
        sim.num_queued(),
        sim.num_running(),
        sim.num_failed(),
        sim.num_completed()
    );
}

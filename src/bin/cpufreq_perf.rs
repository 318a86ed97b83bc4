use clap::Parser;
use tjtools::app;
use tjtools::tools::cpufreq::{self, CpufreqArgs};

#[tokio::main]
async fn main() {
    let args = CpufreqArgs::parse();
    let common = args.common.clone();
    let code = app::launch("cpufreq-perf", common, |config| cpufreq::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::battery::{self, BatteryArgs};

#[tokio::main]
async fn main() {
    let args = BatteryArgs::parse();
    let common = args.common.clone();
    let code = app::launch("sway-battery", common, |config| battery::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::waybar_cmus::{self, WaybarCmusArgs};

#[tokio::main]
async fn main() {
    let args = WaybarCmusArgs::parse();
    let common = args.common.clone();
    let code = app::launch("waybar-cmus", common, |config| waybar_cmus::run(args, config)).await;
    std::process::exit(code);
}

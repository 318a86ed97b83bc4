use clap::Parser;
use tjtools::app;
use tjtools::tools::greeter_idle::{self, GreeterIdleArgs};

#[tokio::main]
async fn main() {
    let args = GreeterIdleArgs::parse();
    let common = args.common.clone();
    let code = app::launch("greeter-idle", common, |config| greeter_idle::run(args, config)).await;
    std::process::exit(code);
}

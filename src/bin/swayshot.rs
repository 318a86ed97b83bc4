use clap::Parser;
use tjtools::app;
use tjtools::tools::swayshot::{self, SwayshotArgs};

#[tokio::main]
async fn main() {
    let args = SwayshotArgs::parse();
    let common = args.common.clone();
    let code = app::launch("swayshot", common, |config| swayshot::run(args, config)).await;
    std::process::exit(code);
}

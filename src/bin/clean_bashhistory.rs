use clap::Parser;
use tjtools::app;
use tjtools::tools::bash_history::{self, BashHistoryArgs};

#[tokio::main]
async fn main() {
    let args = BashHistoryArgs::parse();
    let common = args.common.clone();
    let code = app::launch("clean-bashhistory", common, |config| bash_history::run(args, config)).await;
    std::process::exit(code);
}

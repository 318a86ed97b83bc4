use clap::Parser;
use tjtools::app;
use tjtools::tools::linklist::{self, LinklistArgs};

#[tokio::main]
async fn main() {
    let args = LinklistArgs::parse();
    let common = args.common.clone();
    let code = app::launch("linklist-analyse", common, |config| linklist::run(args, config)).await;
    std::process::exit(code);
}

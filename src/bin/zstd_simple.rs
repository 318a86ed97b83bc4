use clap::Parser;
use tjtools::app;
use tjtools::tools::zstd_simple::{self, ZstdSimpleArgs};

#[tokio::main]
async fn main() {
    let args = ZstdSimpleArgs::parse();
    let common = args.common.clone();
    let code = app::launch("zstd-simple", common, |config| zstd_simple::run(args, config)).await;
    std::process::exit(code);
}

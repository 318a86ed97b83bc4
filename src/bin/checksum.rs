use clap::Parser;
use tjtools::app;
use tjtools::tools::checksum::{self, ChecksumArgs};

#[tokio::main]
async fn main() {
    let args = ChecksumArgs::parse();
    let common = args.common.clone();
    let code = app::launch("checksum", common, |config| checksum::run(args, config)).await;
    std::process::exit(code);
}

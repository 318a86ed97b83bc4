use clap::Parser;
use tjtools::app;
use tjtools::tools::stdcompress::{self, StdcompressArgs};

#[tokio::main]
async fn main() {
    let args = StdcompressArgs::parse();
    let common = args.common.clone();
    let code = app::launch("stdcompress", common, |config| stdcompress::run(args, config)).await;
    std::process::exit(code);
}

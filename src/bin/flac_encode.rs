use clap::Parser;
use tjtools::app;
use tjtools::tools::flac_encode::{self, FlacEncodeArgs};

#[tokio::main]
async fn main() {
    let args = FlacEncodeArgs::parse();
    let common = args.common.clone();
    let code = app::launch("flac-encode", common, |config| flac_encode::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::vc_cleantags::{self, VcCleantagsArgs};

#[tokio::main]
async fn main() {
    let args = VcCleantagsArgs::parse();
    let common = args.common.clone();
    let code = app::launch("vc-cleantags", common, |config| vc_cleantags::run(args, config)).await;
    std::process::exit(code);
}

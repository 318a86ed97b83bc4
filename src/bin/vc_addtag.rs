use clap::Parser;
use tjtools::app;
use tjtools::tools::vc_addtag::{self, VcAddtagArgs};

#[tokio::main]
async fn main() {
    let args = VcAddtagArgs::parse();
    let common = args.common.clone();
    let code = app::launch("vc-addtag", common, |config| vc_addtag::run(args, config)).await;
    std::process::exit(code);
}

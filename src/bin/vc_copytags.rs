use clap::Parser;
use tjtools::app;
use tjtools::tools::vc_copytags::{self, VcCopytagsArgs};

#[tokio::main]
async fn main() {
    let args = VcCopytagsArgs::parse();
    let common = args.common.clone();
    let code = app::launch("vc-copytags", common, |config| vc_copytags::run(args, config)).await;
    std::process::exit(code);
}

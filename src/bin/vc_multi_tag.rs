use clap::Parser;
use tjtools::app;
use tjtools::tools::vc_multi_tag::{self, VcMultiTagArgs};

#[tokio::main]
async fn main() {
    let args = VcMultiTagArgs::parse();
    let common = args.common.clone();
    let code = app::launch("vc-multi-tag", common, |config| vc_multi_tag::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::vc_auto_tracknumber::{self, VcAutoTracknumberArgs};

#[tokio::main]
async fn main() {
    let args = VcAutoTracknumberArgs::parse();
    let common = args.common.clone();
    let code = app::launch("vc-auto-tracknumber", common, |config| vc_auto_tracknumber::run(args, config)).await;
    std::process::exit(code);
}

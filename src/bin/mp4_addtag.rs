use clap::Parser;
use tjtools::app;
use tjtools::tools::mp4_addtag::{self, Mp4AddtagArgs};

#[tokio::main]
async fn main() {
    let args = Mp4AddtagArgs::parse();
    let common = args.common.clone();
    let code = app::launch("mp4-addtag", common, |config| mp4_addtag::run(args, config)).await;
    std::process::exit(code);
}

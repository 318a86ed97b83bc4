use clap::Parser;
use tjtools::app;
use tjtools::tools::sway_multimedia::{self, SwayMultimediaArgs};

#[tokio::main]
async fn main() {
    let args = SwayMultimediaArgs::parse();
    let common = args.common.clone();
    let code = app::launch("sway-multimedia", common, |config| sway_multimedia::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::brightness::{self, BrightnessArgs};

#[tokio::main]
async fn main() {
    let args = BrightnessArgs::parse();
    let common = args.common.clone();
    let code = app::launch("brightness", common, |config| brightness::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::blank_screen::{self, BlankScreenArgs};

#[tokio::main]
async fn main() {
    let args = BlankScreenArgs::parse();
    let common = args.common.clone();
    let code = app::launch("blank-screen", common, |config| blank_screen::run(args, config)).await;
    std::process::exit(code);
}

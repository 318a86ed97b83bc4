use clap::Parser;
use tjtools::app;
use tjtools::tools::dosbox::{self, DosboxArgs};

#[tokio::main]
async fn main() {
    let args = DosboxArgs::parse();
    let common = args.common.clone();
    let code = app::launch("dosbox-wrap", common, |config| dosbox::run(args, config)).await;
    std::process::exit(code);
}

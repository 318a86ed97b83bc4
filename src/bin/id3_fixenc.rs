use clap::Parser;
use tjtools::app;
use tjtools::tools::id3_fixenc::{self, Id3FixencArgs};

#[tokio::main]
async fn main() {
    let args = Id3FixencArgs::parse();
    let common = args.common.clone();
    let code = app::launch("id3-fixenc", common, |config| id3_fixenc::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::id3_addtag::{self, Id3AddtagArgs};

#[tokio::main]
async fn main() {
    let args = Id3AddtagArgs::parse();
    let common = args.common.clone();
    let code = app::launch("id3-addtag", common, |config| id3_addtag::run(args, config)).await;
    std::process::exit(code);
}

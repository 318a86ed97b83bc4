use clap::Parser;
use tjtools::app;
use tjtools::tools::strip_bom::{self, StripBomArgs};

#[tokio::main]
async fn main() {
    let args = StripBomArgs::parse();
    let common = args.common.clone();
    let code = app::launch("strip-utf8bom", common, |config| strip_bom::run(args, config)).await;
    std::process::exit(code);
}

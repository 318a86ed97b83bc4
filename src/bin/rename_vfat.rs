use clap::Parser;
use tjtools::app;
use tjtools::tools::rename_vfat::{self, RenameVfatArgs};

#[tokio::main]
async fn main() {
    let args = RenameVfatArgs::parse();
    let common = args.common.clone();
    let code = app::launch("rename-vfat", common, |config| rename_vfat::run(args, config)).await;
    std::process::exit(code);
}

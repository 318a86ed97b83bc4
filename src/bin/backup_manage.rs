use clap::Parser;
use tjtools::app;
use tjtools::tools::backup::{self, BackupArgs};

#[tokio::main]
async fn main() {
    let args = BackupArgs::parse();
    let common = args.common.clone();
    let code = app::launch("backup-manage", common, |config| backup::run(args, config)).await;
    std::process::exit(code);
}

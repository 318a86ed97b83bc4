use clap::Parser;
use tjtools::app;
use tjtools::tools::mpv_ipc::{self, MpvIpcArgs};

#[tokio::main]
async fn main() {
    let args = MpvIpcArgs::parse();
    let common = args.common.clone();
    let code = app::launch("mpv-ipc", common, |config| mpv_ipc::run(args, config)).await;
    std::process::exit(code);
}

use clap::Parser;
use tjtools::app;
use tjtools::tools::waybar_musicpd::{self, WaybarMusicpdArgs};

#[tokio::main]
async fn main() {
    let args = WaybarMusicpdArgs::parse();
    let common = args.common.clone();
    let code = app::launch("waybar-musicpd", common, |config| waybar_musicpd::run(args, config)).await;
    std::process::exit(code);
}

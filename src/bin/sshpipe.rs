use clap::Parser;
use tjtools::app;
use tjtools::tools::sshpipe::{self, SshpipeArgs};

#[tokio::main]
async fn main() {
    let args = SshpipeArgs::parse();
    let common = args.common.clone();
    let code = app::launch("sshpipe", common, |config| sshpipe::run(args, config)).await;
    std::process::exit(code);
}

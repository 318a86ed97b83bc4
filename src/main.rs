use clap::{Args, Parser, Subcommand};
use tjtools::app;
use tjtools::config::CommonArgs;
use tjtools::tools::{
    backup, bash_history, battery, blank_screen, brightness, checksum, cpufreq, dosbox,
    flac_encode, greeter_idle, id3_addtag, id3_fixenc, linklist, mp4_addtag, mpv_ipc, rename_vfat,
    sshpipe, stdcompress, strip_bom, sway_multimedia, swayshot, vc_addtag, vc_auto_tracknumber,
    vc_cleantags, vc_copytags, vc_multi_tag, waybar_cmus, waybar_musicpd, zstd_simple,
};

#[derive(Parser)]
#[command(name = "tjtools")]
#[command(about = "Personal desktop and media toolbox")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    tool: Tool,
}

#[derive(Subcommand)]
enum Tool {
    Brightness(brightness::BrightnessArgs),
    CpufreqPerf(cpufreq::CpufreqArgs),
    SwayBattery(battery::BatteryArgs),
    WaybarCmus(waybar_cmus::WaybarCmusArgs),
    WaybarMusicpd(waybar_musicpd::WaybarMusicpdArgs),
    MpvIpc(mpv_ipc::MpvIpcArgs),
    BackupManage(backup::BackupArgs),
    ZstdSimple(zstd_simple::ZstdSimpleArgs),
    Stdcompress(stdcompress::StdcompressArgs),
    DosboxWrap(dosbox::DosboxArgs),
    Checksum(checksum::ChecksumArgs),
    #[command(name = "strip-utf8bom")]
    StripUtf8bom(strip_bom::StripBomArgs),
    RenameVfat(rename_vfat::RenameVfatArgs),
    CleanBashhistory(bash_history::BashHistoryArgs),
    LinklistAnalyse(linklist::LinklistArgs),
    FlacEncode(flac_encode::FlacEncodeArgs),
    VcAddtag(vc_addtag::VcAddtagArgs),
    VcCleantags(vc_cleantags::VcCleantagsArgs),
    VcCopytags(vc_copytags::VcCopytagsArgs),
    VcAutoTracknumber(vc_auto_tracknumber::VcAutoTracknumberArgs),
    VcMultiTag(vc_multi_tag::VcMultiTagArgs),
    #[command(name = "id3-addtag")]
    Id3Addtag(id3_addtag::Id3AddtagArgs),
    #[command(name = "id3-fixenc")]
    Id3Fixenc(id3_fixenc::Id3FixencArgs),
    #[command(name = "mp4-addtag")]
    Mp4Addtag(mp4_addtag::Mp4AddtagArgs),
    SwayMultimedia(sway_multimedia::SwayMultimediaArgs),
    Swayshot(swayshot::SwayshotArgs),
    GreeterIdle(greeter_idle::GreeterIdleArgs),
    BlankScreen(blank_screen::BlankScreenArgs),
    Sshpipe(sshpipe::SshpipeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[command(flatten)]
    common: CommonArgs,
}

async fn print_config(common: CommonArgs) -> i32 {
    app::init_logging(&common);
    let rendered = app::load_config(&common).and_then(|c| c.to_toml_string());
    match rendered {
        Ok(toml) => {
            print!("{}", toml);
            0
        }
        Err(e) => app::report("config", &e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.tool {
        Tool::Brightness(args) => {
            let common = args.common.clone();
            app::launch("brightness", common, |c| brightness::run(args, c)).await
        }
        Tool::CpufreqPerf(args) => {
            let common = args.common.clone();
            app::launch("cpufreq-perf", common, |c| cpufreq::run(args, c)).await
        }
        Tool::SwayBattery(args) => {
            let common = args.common.clone();
            app::launch("sway-battery", common, |c| battery::run(args, c)).await
        }
        Tool::WaybarCmus(args) => {
            let common = args.common.clone();
            app::launch("waybar-cmus", common, |c| waybar_cmus::run(args, c)).await
        }
        Tool::WaybarMusicpd(args) => {
            let common = args.common.clone();
            app::launch("waybar-musicpd", common, |c| waybar_musicpd::run(args, c)).await
        }
        Tool::MpvIpc(args) => {
            let common = args.common.clone();
            app::launch("mpv-ipc", common, |c| mpv_ipc::run(args, c)).await
        }
        Tool::BackupManage(args) => {
            let common = args.common.clone();
            app::launch("backup-manage", common, |c| backup::run(args, c)).await
        }
        Tool::ZstdSimple(args) => {
            let common = args.common.clone();
            app::launch("zstd-simple", common, |c| zstd_simple::run(args, c)).await
        }
        Tool::Stdcompress(args) => {
            let common = args.common.clone();
            app::launch("stdcompress", common, |c| stdcompress::run(args, c)).await
        }
        Tool::DosboxWrap(args) => {
            let common = args.common.clone();
            app::launch("dosbox-wrap", common, |c| dosbox::run(args, c)).await
        }
        Tool::Checksum(args) => {
            let common = args.common.clone();
            app::launch("checksum", common, |c| checksum::run(args, c)).await
        }
        Tool::StripUtf8bom(args) => {
            let common = args.common.clone();
            app::launch("strip-utf8bom", common, |c| strip_bom::run(args, c)).await
        }
        Tool::RenameVfat(args) => {
            let common = args.common.clone();
            app::launch("rename-vfat", common, |c| rename_vfat::run(args, c)).await
        }
        Tool::CleanBashhistory(args) => {
            let common = args.common.clone();
            app::launch("clean-bashhistory", common, |c| bash_history::run(args, c)).await
        }
        Tool::LinklistAnalyse(args) => {
            let common = args.common.clone();
            app::launch("linklist-analyse", common, |c| linklist::run(args, c)).await
        }
        Tool::FlacEncode(args) => {
            let common = args.common.clone();
            app::launch("flac-encode", common, |c| flac_encode::run(args, c)).await
        }
        Tool::VcAddtag(args) => {
            let common = args.common.clone();
            app::launch("vc-addtag", common, |c| vc_addtag::run(args, c)).await
        }
        Tool::VcCleantags(args) => {
            let common = args.common.clone();
            app::launch("vc-cleantags", common, |c| vc_cleantags::run(args, c)).await
        }
        Tool::VcCopytags(args) => {
            let common = args.common.clone();
            app::launch("vc-copytags", common, |c| vc_copytags::run(args, c)).await
        }
        Tool::VcAutoTracknumber(args) => {
            let common = args.common.clone();
            app::launch("vc-auto-tracknumber", common, |c| vc_auto_tracknumber::run(args, c)).await
        }
        Tool::VcMultiTag(args) => {
            let common = args.common.clone();
            app::launch("vc-multi-tag", common, |c| vc_multi_tag::run(args, c)).await
        }
        Tool::Id3Addtag(args) => {
            let common = args.common.clone();
            app::launch("id3-addtag", common, |c| id3_addtag::run(args, c)).await
        }
        Tool::Id3Fixenc(args) => {
            let common = args.common.clone();
            app::launch("id3-fixenc", common, |c| id3_fixenc::run(args, c)).await
        }
        Tool::Mp4Addtag(args) => {
            let common = args.common.clone();
            app::launch("mp4-addtag", common, |c| mp4_addtag::run(args, c)).await
        }
        Tool::SwayMultimedia(args) => {
            let common = args.common.clone();
            app::launch("sway-multimedia", common, |c| sway_multimedia::run(args, c)).await
        }
        Tool::Swayshot(args) => {
            let common = args.common.clone();
            app::launch("swayshot", common, |c| swayshot::run(args, c)).await
        }
        Tool::GreeterIdle(args) => {
            let common = args.common.clone();
            app::launch("greeter-idle", common, |c| greeter_idle::run(args, c)).await
        }
        Tool::BlankScreen(args) => {
            let common = args.common.clone();
            app::launch("blank-screen", common, |c| blank_screen::run(args, c)).await
        }
        Tool::Sshpipe(args) => {
            let common = args.common.clone();
            app::launch("sshpipe", common, |c| sshpipe::run(args, c)).await
        }
        Tool::Config(args) => print_config(args.common).await,
    };

    std::process::exit(code);
}

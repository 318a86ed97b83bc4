//! One module per command line tool.

pub mod backup;
pub mod bash_history;
pub mod battery;
pub mod blank_screen;
pub mod brightness;
pub mod checksum;
pub mod cpufreq;
pub mod dosbox;
pub mod flac_encode;
pub mod greeter_idle;
pub mod id3_addtag;
pub mod id3_fixenc;
pub mod linklist;
pub mod mp4_addtag;
pub mod mpv_ipc;
pub mod rename_vfat;
pub mod sshpipe;
pub mod stdcompress;
pub mod strip_bom;
pub mod sway_multimedia;
pub mod swayshot;
pub mod vc_addtag;
pub mod vc_auto_tracknumber;
pub mod vc_cleantags;
pub mod vc_copytags;
pub mod vc_multi_tag;
pub mod waybar;
pub mod waybar_cmus;
pub mod waybar_musicpd;
pub mod zstd_simple;

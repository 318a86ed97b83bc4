use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run a binary with an isolated config directory.
fn run(bin: &str, config_home: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("TJTOOLS_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("spawn binary")
}

#[test]
fn config_subcommand_prints_effective_toml() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("tools.toml");
    std::fs::write(&config, "[compress]\nlevel = 19\n").expect("write config");

    let output = run(
        env!("CARGO_BIN_EXE_tjtools"),
        temp.path(),
        &["config", "--config", config.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[compress]"));
    assert!(stdout.contains("level = 19"));
    assert!(stdout.contains("[backup]"));
}

#[test]
fn missing_config_file_exits_with_configuration_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run(
        env!("CARGO_BIN_EXE_tjtools"),
        temp.path(),
        &["config", "--config", "/definitely/missing.toml"],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("💡"));
}

#[test]
fn strip_bom_binary_and_multiplexer_agree() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("a.txt");
    std::fs::write(&input, b"\xef\xbb\xbfhello").expect("write input");

    let output = run(
        env!("CARGO_BIN_EXE_strip-utf8bom"),
        temp.path(),
        &[input.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        std::fs::read(temp.path().join("a.txt.noBOM")).expect("output"),
        b"hello"
    );

    // Output exists now: invalid input.
    let output = run(
        env!("CARGO_BIN_EXE_tjtools"),
        temp.path(),
        &["strip-utf8bom", input.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn checksum_mismatch_exits_with_integrity_code() {
    let temp = TempDir::new().expect("tempdir");
    let album = temp.path().join("album");
    std::fs::create_dir(&album).expect("mkdir");
    std::fs::write(album.join("track.flac"), "original").expect("write");
    std::fs::write(album.join("album.m3u"), "track.flac\n").expect("write");

    let bin = env!("CARGO_BIN_EXE_checksum");
    let scan = run(bin, temp.path(), &["--sha-scan", album.to_str().unwrap()]);
    assert_eq!(scan.status.code(), Some(0));

    let manifest = album.join("album.sha");
    let check = run(bin, temp.path(), &["--sha-check", manifest.to_str().unwrap()]);
    assert_eq!(check.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&check.stdout).contains("successfully checked 1 files"));

    std::fs::write(album.join("track.flac"), "tampered").expect("write");
    let check = run(bin, temp.path(), &["--sha-check", manifest.to_str().unwrap()]);
    assert_eq!(check.status.code(), Some(5));
}

#[test]
fn mpv_ipc_without_socket_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("tools.toml");
    let socket = temp.path().join("mpv.control");
    std::fs::write(
        &config,
        format!("[media]\nmpv_socket = \"{}\"\n", socket.display()),
    )
    .expect("write config");

    let output = run(
        env!("CARGO_BIN_EXE_mpv-ipc"),
        temp.path(),
        &["--config", config.to_str().unwrap(), "cycle", "pause"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn backup_manage_requires_an_operation() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run(env!("CARGO_BIN_EXE_backup-manage"), temp.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

/// Header-only FLAC: STREAMINFO for 44.1kHz stereo 16 bit, no audio frames.
fn flac_bytes() -> Vec<u8> {
    let mut out = b"fLaC".to_vec();
    out.extend_from_slice(&[0x80, 0x00, 0x00, 0x22, 0x10, 0x00, 0x10, 0x00]);
    out.extend_from_slice(&[0u8; 6]);
    out.extend_from_slice(&[0x0a, 0xc4, 0x42, 0xf0, 0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0u8; 16]);
    out
}

#[test]
fn vc_addtag_then_list_through_multiplexer() {
    let temp = tempfile::tempdir().expect("tempdir");
    let track = temp.path().join("01.flac");
    std::fs::write(&track, flac_bytes()).expect("write flac");
    let track = track.to_str().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_vc-addtag"),
        temp.path(),
        &["-f", track, "-t", "title:Prelude", "-t", "replaygain_track_gain:-5.00 dB"],
    );
    assert_eq!(output.status.code(), Some(0));

    let output = run(
        env!("CARGO_BIN_EXE_tjtools"),
        temp.path(),
        &["vc-addtag", "-f", track],
    );
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("title = Prelude"));
    assert!(stdout.contains("replaygain_track_gain = -5.00 dB"));
}

#[test]
fn tag_tools_reject_unsupported_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let text = temp.path().join("notes.flac");
    std::fs::write(&text, "just text").expect("write");

    let output = run(
        env!("CARGO_BIN_EXE_vc-cleantags"),
        temp.path(),
        &[text.to_str().unwrap(), "comment"],
    );
    assert_ne!(output.status.code(), Some(0));

    let output = run(
        env!("CARGO_BIN_EXE_tjtools"),
        temp.path(),
        &["id3-addtag", "-f", "/definitely/missing.mp3"],
    );
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn blank_screen_without_sway_session_is_a_noop() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("tools.toml");
    std::fs::write(
        &config,
        format!("[sway]\nrun_dir = \"{}\"\n", temp.path().display()),
    )
    .expect("write config");

    let output = run(
        env!("CARGO_BIN_EXE_blank-screen"),
        temp.path(),
        &["--config", config.to_str().unwrap(), "--user", "root"],
    );
    assert_eq!(output.status.code(), Some(0));
}

use anyhow::Result;
use tempfile::TempDir;
use tjtools::tools::{bash_history, linklist, rename_vfat, strip_bom};

#[test]
fn test_strip_bom_then_refuse_overwrite() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("playlist.m3u");
    std::fs::write(&input, b"\xef\xbb\xbf01 - Intro.flac\n")?;

    let output = strip_bom::strip_utf8_bom(&input, None)?;
    assert_eq!(std::fs::read_to_string(&output)?, "01 - Intro.flac\n");

    // Source stays untouched.
    assert!(std::fs::read(&input)?.starts_with(b"\xef\xbb\xbf"));
    assert!(strip_bom::strip_utf8_bom(&input, None).is_err());
    Ok(())
}

#[test]
fn test_rename_vfat_tree() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let album = temp_dir.path().join("Artist - Album");
    std::fs::create_dir_all(album.join("Disc 1"))?;
    std::fs::write(album.join("Disc 1/01 - Why?.flac"), "a")?;
    std::fs::write(album.join("Disc 1/02 - A*B.flac"), "b")?;
    std::fs::write(album.join("cover.jpg"), "c")?;

    let outcomes = rename_vfat::rename_dir(&album)?;
    let renamed = outcomes
        .iter()
        .filter(|o| matches!(o, rename_vfat::RenameOutcome::Renamed(_)))
        .count();

    assert_eq!(renamed, 2);
    assert!(album.join("Disc 1/01 - Why_.flac").is_file());
    assert!(album.join("Disc 1/02 - A_B.flac").is_file());
    assert!(album.join("cover.jpg").is_file());
    Ok(())
}

#[test]
fn test_clean_bash_history_keeps_recent_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let history = temp_dir.path().join(".bash_history");
    std::fs::write(&history, "ls\nssh host\nls\nvim notes\nssh host\n")?;

    let removed = bash_history::clean_history(&history)?;

    assert_eq!(removed, 2);
    assert_eq!(std::fs::read_to_string(&history)?, "ls\nvim notes\nssh host\n");
    Ok(())
}

#[test]
fn test_linklist_stems_from_nested_media() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let media = temp_dir.path().join("media");
    std::fs::create_dir_all(media.join("2024"))?;
    std::fs::write(media.join("2024/clip-0001.mp4"), "")?;
    std::fs::write(media.join("poster-0002.jpeg"), "")?;
    std::fs::write(media.join("readme.md"), "")?;

    let stems = linklist::collect_stems(&media)?;
    let list = "https://host/clip-0001\nhttps://host/clip-0003\nhttps://host/poster-0002\n";

    let found: Vec<usize> = linklist::removable_lines(list, &stems)
        .into_iter()
        .map(|(lineno, _)| lineno)
        .collect();
    assert_eq!(found, vec![1, 3]);
    assert_eq!(
        linklist::remaining_lines(list, &stems),
        vec!["https://host/clip-0003"]
    );
    Ok(())
}

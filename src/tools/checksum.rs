//! SHA-256 manifests for album directories, plus SFV/MD5 verification and
//! migration of legacy checksum files.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use crate::utils::fs::file_name_string;
use crate::utils::validation::{require_dir, require_file};
use clap::{ArgGroup, Parser};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const FILTERED_EXTENSIONS: [&str; 4] = ["m3u", "sha", "sfv", "md5"];

#[derive(Debug, Clone, Parser)]
#[command(name = "checksum", about = "Create and verify checksum files")]
#[command(group(ArgGroup::new("mode").required(true)))]
pub struct ChecksumArgs {
    /// Write a SHA-256 manifest for a directory
    #[arg(short = 's', long, group = "mode", value_name = "DIR")]
    pub sha_scan: Option<PathBuf>,

    /// Verify a SHA-256 manifest
    #[arg(short = 'c', long, group = "mode", value_name = "FILE")]
    pub sha_check: Option<PathBuf>,

    /// Verify an SFV file with cksfv
    #[arg(short = 'f', long, group = "mode", value_name = "FILE")]
    pub sfv_check: Option<PathBuf>,

    /// Replace an SFV file (and MD5 file) with a SHA-256 manifest
    #[arg(short = 'm', long, group = "mode", value_name = "FILE")]
    pub sfv_migrate: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// One manifest line: `<size> <sha256 hex> <file name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaEntry {
    pub size: u64,
    pub hash: Vec<u8>,
    pub filename: String,
}

impl ShaEntry {
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |what: &str| ToolError::mismatch(format!("malformed SHA line: {}", what));

        let (size, rest) = line
            .trim()
            .split_once(' ')
            .ok_or_else(|| malformed(line))?;
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(size));
        }
        let size = size.parse().map_err(|_| malformed(size))?;

        let (hash, filename) = rest
            .trim()
            .split_once(' ')
            .ok_or_else(|| malformed(rest))?;
        let hash = hex::decode(hash).map_err(|e| malformed(&format!("{}: {}", hash, e)))?;

        Ok(Self {
            size,
            hash,
            filename: filename.trim().to_string(),
        })
    }

    pub fn to_line(&self) -> String {
        format!("{}  {}  {}", self.size, hex::encode(&self.hash), self.filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub bytes: u64,
}

pub fn is_filtered(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FILTERED_EXTENSIONS.contains(&e))
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name).extension().and_then(|e| e.to_str()) == Some(ext)
}

fn sorted_listing(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `<m3u stem>.sha`, or the first free `00 <dir> (<n>).sha`.
pub fn manifest_name(dir: &Path) -> Result<String> {
    let listing = sorted_listing(dir)?;
    if let Some(m3u) = listing.iter().find(|n| has_extension(n, "m3u")) {
        let stem = Path::new(m3u)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(format!("{}.sha", stem));
    }

    let base = file_name_string(dir);
    let mut index = 1;
    loop {
        let candidate = format!("00 {} ({}).sha", base, index);
        if !dir.join(&candidate).exists() {
            println!("info: no M3U found: using filename: {}", candidate);
            return Ok(candidate);
        }
        index += 1;
    }
}

/// Size and SHA-256 digest of a file.
pub fn hash_file(path: &Path) -> Result<(u64, Vec<u8>)> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let size = std::io::copy(&mut file, &mut hasher)?;
    Ok((size, hasher.finalize().to_vec()))
}

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run `job` on a blocking thread for every item, at most `jobs` at a time.
/// Results come back in input order.
async fn run_bounded<T, R, F>(items: Vec<T>, jobs: usize, job: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let job = Arc::new(job);
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let job = Arc::clone(&job);
        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ToolError::invalid_input(e.to_string()))?;
            let result = tokio::task::spawn_blocking(move || job(item)).await??;
            Ok::<_, ToolError>((index, result))
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        results.push(joined??);
    }
    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, r)| r).collect())
}

/// Hash the non-checksum files of `dir` (or only `only` when given), sorted by name.
pub async fn scan_directory(dir: &Path, only: Option<Vec<String>>) -> Result<Vec<ShaEntry>> {
    let mut files: Vec<String> = match only {
        Some(list) => list,
        None => sorted_listing(dir)?,
    }
    .into_iter()
    .filter(|name| !is_filtered(name) && dir.join(name).is_file())
    .collect();
    files.sort();

    if files.is_empty() {
        return Err(ToolError::invalid_input("no files found to check"));
    }

    let dir = dir.to_path_buf();
    run_bounded(files, worker_count(), move |filename| {
        let (size, hash) = hash_file(&dir.join(&filename))?;
        Ok(ShaEntry {
            size,
            hash,
            filename,
        })
    })
    .await
}

pub fn render_manifest(entries: &[ShaEntry]) -> String {
    entries.iter().map(|e| e.to_line() + "\n").collect()
}

pub async fn sha_scan(dir: &Path) -> Result<PathBuf> {
    let dir = PathBuf::from(dir.to_string_lossy().trim_end_matches('/'));
    require_dir(&dir)?;
    let dir = dir.canonicalize()?;

    let manifest = dir.join(manifest_name(&dir)?);
    if manifest.exists() {
        return Err(ToolError::invalid_input(format!(
            "directory already has a checksum: {}",
            dir.display()
        )));
    }

    let entries = scan_directory(&dir, None).await?;
    std::fs::write(&manifest, render_manifest(&entries))?;
    tracing::info!("Wrote {} ({} files)", manifest.display(), entries.len());
    Ok(manifest)
}

pub async fn sha_check(manifest: &Path) -> Result<CheckSummary> {
    require_file(manifest)?;
    let entries = std::fs::read_to_string(manifest)?
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(ShaEntry::parse)
        .collect::<Result<Vec<_>>>()?;

    let base = parent_dir(manifest);
    let dir = base.clone();
    run_bounded(entries.clone(), worker_count(), move |entry| {
        let (size, hash) = hash_file(&dir.join(&entry.filename))?;
        if hash != entry.hash {
            return Err(ToolError::mismatch(format!("hash mismatch for: {}", entry.filename)));
        }
        if size != entry.size {
            return Err(ToolError::mismatch(format!(
                "filesize mismatch for: {}",
                entry.filename
            )));
        }
        Ok(())
    })
    .await?;

    for name in sorted_listing(&base)? {
        if is_filtered(&name) || !base.join(&name).is_file() {
            continue;
        }
        let matches = entries.iter().filter(|e| e.filename == name).count();
        if matches != 1 {
            return Err(ToolError::mismatch(format!("file without checksum: {}", name)));
        }
    }

    Ok(CheckSummary {
        files: entries.len(),
        bytes: entries.iter().map(|e| e.size).sum(),
    })
}

/// Entries of an SFV file as `(filename, crc)`; comments and blank lines are skipped.
pub fn parse_sfv(content: &str) -> Result<Vec<(String, String)>> {
    let entry = Regex::new(r"^\s*(.+\S)\s+(\S+)")?;
    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with(';'))
        .filter_map(|l| {
            let caps = entry.captures(l)?;
            Some((caps[1].to_string(), caps[2].to_string()))
        })
        .collect())
}

fn split_location(file: &Path) -> Result<(PathBuf, String)> {
    require_file(file)?;
    let absolute = file.canonicalize()?;
    Ok((parent_dir(&absolute), file_name_string(&absolute)))
}

pub async fn sfv_check<R: CommandRunner>(runner: &R, sfv: &Path) -> Result<()> {
    let (dir, name) = split_location(sfv)?;
    let spec = CommandSpec::new("cksfv").args(["-q", "-f"]).arg(name).cwd(dir);
    runner.run_checked(&spec).await.map(|_| ())
}

pub async fn md5_check<R: CommandRunner>(runner: &R, md5: &Path) -> Result<()> {
    let (dir, name) = split_location(md5)?;
    let files: Vec<String> = sorted_listing(&dir)?
        .into_iter()
        .filter(|f| !is_filtered(f))
        .collect();
    if files.is_empty() {
        return Err(ToolError::invalid_input("no files found to check"));
    }

    let spec = CommandSpec::new("md5deep")
        .args(["-s", "-x"])
        .arg(name)
        .args(files)
        .cwd(dir);
    runner.run_checked(&spec).await.map(|_| ())
}

fn stem_of(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Files belonging to a single-file SFV: the referenced file plus sibling
/// `.sfv`/`.md5` files sharing its stem.
pub fn single_file_list(sfv: &Path) -> Result<Option<Vec<String>>> {
    let dir = parent_dir(sfv);
    let sfv_stem = stem_of(&file_name_string(sfv));

    let entries = parse_sfv(&std::fs::read_to_string(sfv)?)?;
    let [(reference, _)] = entries.as_slice() else {
        tracing::error!("singlefile check failed: multiple entries in SFV");
        return Ok(None);
    };
    if stem_of(reference) != sfv_stem {
        tracing::error!("singlefile check failed: filename mismatch");
        return Ok(None);
    }

    let mut reference_found = false;
    let mut list = Vec::new();
    for name in sorted_listing(&dir)? {
        if stem_of(&name) != sfv_stem {
            continue;
        }
        if has_extension(&name, "sfv") || has_extension(&name, "md5") {
            list.push(name);
        } else if name == *reference {
            reference_found = true;
            list.push(name);
        }
    }

    Ok(reference_found.then_some(list))
}

pub async fn sfv_migrate<R: CommandRunner>(runner: &R, sfv: &Path) -> Result<PathBuf> {
    sfv_check(runner, sfv).await?;

    let (dir, name) = split_location(sfv)?;
    if !has_extension(&name, "sfv") {
        return Err(ToolError::invalid_input(format!(
            "failed to find file prefix: {}",
            sfv.display()
        )));
    }
    let prefix = stem_of(&name);
    let sfv_path = dir.join(&name);

    let only = if dir.join(format!("{}.m3u", prefix)).is_file() {
        None
    } else {
        Some(single_file_list(&sfv_path)?.ok_or_else(|| {
            ToolError::invalid_input(format!("no M3U could be located: {}", dir.display()))
        })?)
    };

    let md5_path = dir.join(format!("{}.md5", prefix));
    let has_md5 = md5_path.is_file();
    if has_md5 {
        md5_check(runner, &md5_path).await?;
    }

    let sha_path = dir.join(format!("{}.sha", prefix));
    if sha_path.exists() {
        return Err(ToolError::invalid_input(format!(
            "directory already has a SHA checksum: {}",
            dir.display()
        )));
    }

    let entries = scan_directory(&dir, only).await?;
    std::fs::write(&sfv_path, render_manifest(&entries))?;
    std::fs::rename(&sfv_path, &sha_path)?;
    if has_md5 {
        std::fs::remove_file(&md5_path)?;
    }

    tracing::info!("Migrated {} to {}", sfv_path.display(), sha_path.display());
    Ok(sha_path)
}

pub async fn run(args: ChecksumArgs, _config: ToolboxConfig) -> Result<()> {
    let runner = SystemRunner;

    if let Some(dir) = args.sha_scan {
        sha_scan(&dir).await?;
    } else if let Some(manifest) = args.sha_check {
        let summary = sha_check(&manifest).await?;
        println!(
            "info: successfully checked {} files, {} bytes total",
            summary.files, summary.bytes
        );
    } else if let Some(sfv) = args.sfv_check {
        sfv_check(&runner, &sfv).await?;
    } else if let Some(sfv) = args.sfv_migrate {
        sfv_migrate(&runner, &sfv).await?;
    }
    Ok(())
}

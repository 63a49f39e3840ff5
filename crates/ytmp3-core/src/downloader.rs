//! YouTube to MP3 fetcher using yt-dlp

use crate::config::{Bitrate, Config};
use crate::error::{DownloadError, Ytmp3Error};
use crate::fetch::Fetch;
use crate::metadata::VideoMetadata;
use crate::outcome::{Outcome, WorkItem};

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
    bitrate: Bitrate,
}

/// Successful result of a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Downloaded { title: String, path: PathBuf },
    AlreadyPresent { title: String, path: PathBuf },
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf, ffmpeg_path: Option<PathBuf>, bitrate: Bitrate) -> Self {
        Self {
            yt_dlp_path,
            ffmpeg_path,
            bitrate,
        }
    }

    /// Build from configuration. A missing yt-dlp is fatal here, before any work starts.
    pub fn from_config(config: &Config, bitrate: Bitrate) -> Result<Self, Ytmp3Error> {
        let yt_dlp_path = config
            .yt_dlp_path()
            .map_err(|_| DownloadError::YtDlpNotFound)?;

        Ok(Self::new(yt_dlp_path, config.ffmpeg_path(), bitrate))
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    /// Probe a URL without downloading. Returns the parsed metadata and the raw info JSON.
    pub async fn probe(&self, url: &str) -> Result<(VideoMetadata, String), DownloadError> {
        debug!("Probing: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["-J", "--no-playlist", "--no-warnings", url])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_failure(url, output.status.code(), &stderr));
        }

        let info_json = String::from_utf8_lossy(&output.stdout).into_owned();
        let metadata = VideoMetadata::from_json(&info_json)?;

        if metadata.is_playlist() {
            return Err(DownloadError::Playlist(url.to_string()));
        }

        Ok((metadata, info_json))
    }

    /// Download and convert one URL into `<dest>/<title>.mp3`, skipping if it is already there
    pub async fn download(&self, url: &str, dest: &Path) -> Result<Fetched, DownloadError> {
        let (metadata, info_json) = self.probe(url).await?;
        let title = metadata.title().to_string();
        let stem = metadata.file_stem();
        let mp3_path = dest.join(format!("{}.mp3", stem));

        if mp3_path.exists() {
            debug!("Already present: {}", mp3_path.display());
            return Ok(Fetched::AlreadyPresent {
                title,
                path: mp3_path,
            });
        }

        debug!("Downloading audio from: {}", url);

        // Hand the probed info back to yt-dlp so extraction is not repeated
        let info_file = tempfile::Builder::new()
            .prefix("ytmp3-")
            .suffix(".info.json")
            .tempfile()?;
        tokio::fs::write(info_file.path(), info_json.as_bytes()).await?;

        let output = Command::new(&self.yt_dlp_path)
            .args(self.download_args(info_file.path(), dest, &stem))
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_failure(url, output.status.code(), &stderr));
        }

        if !mp3_path.exists() {
            return Err(DownloadError::OutputMissing(mp3_path));
        }

        debug!("Converted: {} -> {}", title, mp3_path.display());
        Ok(Fetched::Downloaded {
            title,
            path: mp3_path,
        })
    }

    fn download_args(&self, info_json: &Path, dest: &Path, stem: &str) -> Vec<OsString> {
        // `%` would otherwise be read as a template field
        let template = dest.join(format!("{}.%(ext)s", stem.replace('%', "%%")));

        let mut args: Vec<OsString> = vec![
            "--load-info-json".into(),
            info_json.into(),
            // Best audio, falling back to best overall
            "-f".into(),
            "bestaudio/best".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--audio-quality".into(),
            self.bitrate.to_string().into(),
            "--no-overwrites".into(),
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
            "-o".into(),
            template.into(),
        ];

        if let Some(ref ffmpeg) = self.ffmpeg_path {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.into());
        }

        args
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch(&self, item: &WorkItem, dest: &Path) -> Outcome {
        into_outcome(item, self.download(&item.url, dest).await)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

fn into_outcome(item: &WorkItem, result: Result<Fetched, DownloadError>) -> Outcome {
    match result {
        Ok(Fetched::Downloaded { title, .. }) => Outcome::success(title, "Downloaded & converted"),
        Ok(Fetched::AlreadyPresent { title, .. }) => {
            Outcome::skipped(title, "Skipped (already exists)")
        }
        Err(e) => Outcome::failed(item.url.clone(), e.to_string()),
    }
}

/// Map a failed yt-dlp run to a download error using its stderr
fn classify_failure(url: &str, code: Option<i32>, stderr: &str) -> DownloadError {
    if stderr.contains("Video unavailable") || stderr.contains("Private video") {
        return DownloadError::VideoUnavailable(url.to_string());
    }
    if stderr.contains("is not a valid URL") || stderr.contains("Unsupported URL") {
        return DownloadError::InvalidUrl(url.to_string());
    }

    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let message = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "no error output".to_string());

    DownloadError::YtDlpFailed { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;

    fn downloader(ffmpeg: Option<&str>) -> Downloader {
        Downloader::new(
            PathBuf::from("yt-dlp"),
            ffmpeg.map(PathBuf::from),
            "192K".parse().unwrap(),
        )
    }

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_download_args() {
        let args = downloader(None).download_args(
            Path::new("/tmp/x.info.json"),
            Path::new("downloads"),
            "Song Title",
        );
        let args = args_as_strings(&args);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--load-info-json") + 1], "/tmp/x.info.json");
        assert_eq!(args[pos("--audio-format") + 1], "mp3");
        assert_eq!(args[pos("--audio-quality") + 1], "192K");
        assert_eq!(args[pos("-f") + 1], "bestaudio/best");
        assert_eq!(
            PathBuf::from(&args[pos("-o") + 1]),
            Path::new("downloads").join("Song Title.%(ext)s")
        );
        assert!(args.contains(&"--no-overwrites".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--ffmpeg-location".to_string()));
    }

    #[test]
    fn test_download_args_with_ffmpeg_and_percent() {
        let args = downloader(Some("/opt/ffmpeg/bin/ffmpeg")).download_args(
            Path::new("info.json"),
            Path::new("out"),
            "100% Hits",
        );
        let args = args_as_strings(&args);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--ffmpeg-location") + 1], "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(
            PathBuf::from(&args[pos("-o") + 1]),
            Path::new("out").join("100%% Hits.%(ext)s")
        );
    }

    #[test]
    fn test_classify_failure() {
        let url = "https://www.youtube.com/watch?v=gone";

        let err = classify_failure(url, Some(1), "ERROR: [youtube] gone: Video unavailable");
        assert!(matches!(err, DownloadError::VideoUnavailable(_)));

        let err = classify_failure("nope", Some(2), "ERROR: 'nope' is not a valid URL.");
        assert!(matches!(err, DownloadError::InvalidUrl(_)));

        let stderr = "WARNING: something odd\nERROR: unable to download video data: HTTP Error 403: Forbidden\n";
        match classify_failure(url, Some(1), stderr) {
            DownloadError::YtDlpFailed { code, message } => {
                assert_eq!(code, Some(1));
                assert_eq!(message, "unable to download video data: HTTP Error 403: Forbidden");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match classify_failure(url, None, "") {
            DownloadError::YtDlpFailed { code, message } => {
                assert_eq!(code, None);
                assert_eq!(message, "no error output");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_outcome() {
        let item = WorkItem::new(1, "https://youtu.be/abc");

        let ok = into_outcome(
            &item,
            Ok(Fetched::Downloaded {
                title: "Song".to_string(),
                path: PathBuf::from("downloads/Song.mp3"),
            }),
        );
        assert_eq!(ok.status, OutcomeStatus::Success);
        assert_eq!(ok.label, "Song");

        let skip = into_outcome(
            &item,
            Ok(Fetched::AlreadyPresent {
                title: "Song".to_string(),
                path: PathBuf::from("downloads/Song.mp3"),
            }),
        );
        assert_eq!(skip.status, OutcomeStatus::Skipped);

        let fail = into_outcome(&item, Err(DownloadError::InvalidUrl(item.url.clone())));
        assert_eq!(fail.status, OutcomeStatus::Failed);
        assert_eq!(fail.label, "https://youtu.be/abc");
        assert_eq!(fail.detail, "Invalid URL: https://youtu.be/abc");
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Downloader::new(
            dir.path().join("no-such-yt-dlp"),
            None,
            Bitrate::default(),
        );
        let item = WorkItem::new(1, "https://youtu.be/abc");

        let outcome = fetcher.fetch(&item, dir.path()).await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.label, item.url);
        assert!(!outcome.detail.is_empty());
    }

    #[test]
    fn test_from_config_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let yt_dlp = dir.path().join("yt-dlp");
        std::fs::write(&yt_dlp, "").unwrap();

        let mut config = Config::default();
        config.paths.yt_dlp = Some(yt_dlp.clone());
        config.paths.ffmpeg = Some(PathBuf::from("/opt/bin/ffmpeg"));

        let fetcher = Downloader::from_config(&config, Bitrate::new(320).unwrap()).unwrap();
        assert_eq!(fetcher.yt_dlp_path, yt_dlp);
        assert_eq!(fetcher.ffmpeg_path, Some(PathBuf::from("/opt/bin/ffmpeg")));
        assert_eq!(fetcher.bitrate().kbps(), 320);
    }

    #[test]
    fn test_from_config_rejects_missing_yt_dlp() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.yt_dlp = Some(dir.path().join("no-such-yt-dlp"));

        let err = Downloader::from_config(&config, Bitrate::default()).unwrap_err();
        assert!(matches!(
            err,
            Ytmp3Error::Download(DownloadError::YtDlpNotFound)
        ));
        assert!(err.to_string().contains("github.com/yt-dlp/yt-dlp#installation"));
    }

    /// Stand-in yt-dlp: `-J` prints info JSON, a download run checks the
    /// handed-over info file and creates the `-o` target as `.mp3` unless
    /// `create_output` is false.
    #[cfg(unix)]
    fn fake_yt_dlp(dir: &Path, create_output: bool) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let touch = if create_output { r#": > "$target""# } else { ":" };
        let script = format!(
            r#"#!/bin/sh
case "$1" in
  --version) echo 2024.08.06; exit 0 ;;
  -J) echo '{{"id":"abc123","title":"My: Song?"}}'; exit 0 ;;
esac
info=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --load-info-json) info="$2"; shift ;;
    -o) out="$2"; shift ;;
  esac
  shift
done
grep -q abc123 "$info" || {{ echo "ERROR: info json not handed over" >&2; exit 3; }}
target=$(printf '%s' "$out" | sed 's/%(ext)s$/mp3/')
{touch}
exit 0
"#
        );

        let path = dir.join("yt-dlp");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        // A concurrently forked test process may briefly hold the write handle
        // open, which makes exec fail with ETXTBSY until it is released
        for _ in 0..50 {
            match std::process::Command::new(&path).arg("--version").output() {
                Ok(out) if out.status.success() => break,
                _ => std::thread::sleep(std::time::Duration::from_millis(20)),
            }
        }
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_then_skip_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("downloads");
        std::fs::create_dir(&dest).unwrap();
        let fetcher = Downloader::new(fake_yt_dlp(dir.path(), true), None, Bitrate::default());
        let item = WorkItem::new(1, "https://www.youtube.com/watch?v=abc123");

        let first = fetcher.fetch(&item, &dest).await;
        assert_eq!(first.status, OutcomeStatus::Success, "{}", first.detail);
        assert_eq!(first.label, "My: Song?");
        assert!(dest.join("My_ Song_.mp3").is_file());

        let second = fetcher.fetch(&item, &dest).await;
        assert_eq!(second.status, OutcomeStatus::Skipped);
        assert_eq!(second.label, "My: Song?");
        assert_eq!(second.detail, "Skipped (already exists)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_without_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Downloader::new(fake_yt_dlp(dir.path(), false), None, Bitrate::default());
        let item = WorkItem::new(1, "https://www.youtube.com/watch?v=abc123");

        let outcome = fetcher.fetch(&item, dir.path()).await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.label, item.url);
        assert!(outcome.detail.starts_with("Output file missing after conversion"));
        assert!(outcome.detail.contains("My_ Song_.mp3"));
    }
}

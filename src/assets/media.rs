use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assets::decode::RasterSource;
use crate::foundation::core::Raster;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Default bound on each external decoder invocation.
pub const DEFAULT_MEDIA_TIMEOUT: Duration = Duration::from_secs(30);

/// Seeking exactly to the end of a stream yields no frame; stay this far inside it.
const END_GUARD_SEC: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
}

/// Map a fraction of the duration to a seek time that still lands on a decodable frame.
pub fn frame_time_sec(info: &VideoSourceInfo, fraction: f64) -> BackdropResult<f64> {
    if !fraction.is_finite() {
        return Err(BackdropError::validation(format!(
            "frame fraction must be finite, got {fraction}"
        )));
    }
    let duration = info.duration_sec.max(0.0);
    let t = duration * fraction.clamp(0.0, 1.0);
    Ok(t.min((duration - END_GUARD_SEC).max(0.0)))
}

/// Still frame of a video, selected by a fraction of its duration.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub path: PathBuf,
    pub fraction: f64,
    pub timeout: Duration,
}

impl VideoFrame {
    pub fn new(path: impl Into<PathBuf>, fraction: f64) -> Self {
        Self {
            path: path.into(),
            fraction,
            timeout: DEFAULT_MEDIA_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl RasterSource for VideoFrame {
    fn describe(&self) -> String {
        format!(
            "video '{}' at {:.3} of duration",
            self.path.display(),
            self.fraction
        )
    }

    fn load(&self) -> BackdropResult<Raster> {
        let info = probe_video(&self.path, self.timeout)?;
        let t = frame_time_sec(&info, self.fraction)?;
        tracing::debug!(path = %self.path.display(), t, "extracting still frame");
        decode_video_frame(&info, t, self.timeout)
    }
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path, timeout: Duration) -> BackdropResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let mut cmd = std::process::Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(source_path);
    let stdout = run_with_timeout(cmd, timeout, "ffprobe")?;

    let parsed: ProbeOut = serde_json::from_slice(&stdout).map_err(|e| {
        BackdropError::source_unavailable(format!("ffprobe json parse failed: {e}"))
    })?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| BackdropError::source_unavailable("no video stream found"))?;
    let (Some(width), Some(height)) = (video_stream.width, video_stream.height) else {
        return Err(BackdropError::source_unavailable(
            "missing video dimensions from ffprobe",
        ));
    };
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path, _timeout: Duration) -> BackdropResult<VideoSourceInfo> {
    Err(BackdropError::source_unavailable(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Decode one RGBA frame at `time_sec`. Frames are piped, so nothing is left on disk.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_video_frame(
    source: &VideoSourceInfo,
    time_sec: f64,
    timeout: Duration,
) -> BackdropResult<Raster> {
    let cmd = frame_extract_command(source, time_sec);
    let stdout = run_with_timeout(cmd, timeout, "ffmpeg")?;

    let expected_len = crate::foundation::core::expected_len(source.width, source.height)?;
    if stdout.len() < expected_len {
        return Err(BackdropError::source_unavailable(format!(
            "decoded video frame has {} bytes, expected {expected_len} for '{}'",
            stdout.len(),
            source.source_path.display()
        )));
    }
    let mut data = stdout;
    data.truncate(expected_len);
    Raster::new(source.width, source.height, data)
}

/// ffmpeg invocation for one raw RGBA frame on stdout.
///
/// Rotation metadata is ignored so the frame keeps the coded size ffprobe reported.
#[cfg(feature = "media-ffmpeg")]
fn frame_extract_command(source: &VideoSourceInfo, time_sec: f64) -> std::process::Command {
    let mut cmd = std::process::Command::new("ffmpeg");
    cmd.args(["-v", "error", "-noautorotate", "-ss", &format!("{time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ]);
    cmd
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frame(
    _source: &VideoSourceInfo,
    _time_sec: f64,
    _timeout: Duration,
) -> BackdropResult<Raster> {
    Err(BackdropError::source_unavailable(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Run `cmd` to completion and return its stdout, killing it once `timeout` elapses.
#[cfg(feature = "media-ffmpeg")]
fn run_with_timeout(
    mut cmd: std::process::Command,
    timeout: Duration,
    what: &str,
) -> BackdropResult<Vec<u8>> {
    use std::io::Read as _;
    use std::process::Stdio;
    use std::time::Instant;

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BackdropError::source_unavailable(format!("failed to run {what}: {e}")))?;

    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        return Err(BackdropError::source_unavailable(format!(
            "{what} pipes unavailable"
        )));
    };
    let out_reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });
    let err_reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackdropError::source_unavailable(format!(
                    "{what} timed out after {timeout:?}"
                )));
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(10)),
            Err(e) => {
                let _ = child.kill();
                return Err(BackdropError::source_unavailable(format!(
                    "wait for {what}: {e}"
                )));
            }
        }
    };

    let stdout = out_reader
        .join()
        .map_err(|_| BackdropError::source_unavailable(format!("{what} stdout reader panicked")))?
        .map_err(|e| BackdropError::source_unavailable(format!("read {what} stdout: {e}")))?;
    let stderr = err_reader.join().unwrap_or_default();

    if !status.success() {
        return Err(BackdropError::source_unavailable(format!(
            "{what} failed: {}",
            String::from_utf8_lossy(&stderr).trim()
        )));
    }
    Ok(stdout)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;

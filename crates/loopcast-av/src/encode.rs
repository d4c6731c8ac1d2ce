//! FFmpeg invocation building and execution.
//!
//! Argument construction is pure so the exact command shape is testable
//! without an encoder installed; [`run_ffmpeg`] does the subprocess work.

use std::path::Path;

use loopcast_spec::{BitrateMode, Container, Resolution, VideoSpec};
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Nominal HLS segment duration in seconds.
pub const HLS_SEGMENT_SECONDS: u32 = 1;

/// Scale-then-center-crop filter guaranteeing an exact target frame size.
///
/// Scaling with `force_original_aspect_ratio=increase` first covers the
/// target box, then the crop trims the overhang, so no source aspect ratio
/// produces letterboxing.
pub fn scale_crop_filter(res: Resolution) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
        w = res.width,
        h = res.height
    )
}

/// Muxer flags that let playback begin before the file is fully written.
fn streaming_args(container: Container) -> &'static [&'static str] {
    match container {
        // Fragmented MP4: moov up front, fragments as they are encoded.
        Container::Mp4 => &["-movflags", "+frag_keyframe+empty_moov+default_base_moof"],
        // The WebM muxer streams natively; just pin the format.
        Container::Webm => &["-f", "webm"],
    }
}

fn require<T: Copy>(field: Option<T>, name: &str) -> Result<T> {
    field.ok_or_else(|| Error::InvalidInput(format!("unresolved spec: missing {}", name)))
}

/// Build the ffmpeg argument sequence producing the artifact described by a
/// fully resolved spec.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when a field required by the enabled
/// tracks is unset, i.e. the caller skipped defaulting.
pub fn transcode_args(spec: &VideoSpec, input: &Path, output: &Path) -> Result<Vec<String>> {
    let duration = require(spec.duration, "duration")?;
    let codec = require(spec.codec, "codec")?;
    let audio_codec = require(spec.audio_codec, "audio codec")?;
    let container = require(spec.container, "container")?;

    let mut args: Vec<String> = vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-t".into(),
        duration.to_string(),
    ];

    match codec.encoder() {
        Some(encoder) => {
            let resolution = require(spec.resolution, "resolution")?;
            let fps = require(spec.fps, "fps")?;
            let bitrate = require(spec.bitrate, "bitrate")?;

            args.extend(["-vf".into(), scale_crop_filter(resolution)]);
            args.extend(["-c:v".into(), encoder.into(), "-r".into(), fps.to_string()]);
            args.extend(codec.tuning_args().iter().map(|s| s.to_string()));

            match bitrate.mode {
                BitrateMode::Crf => {
                    args.extend(["-crf".into(), bitrate.value.to_string()]);
                }
                BitrateMode::Cbr => {
                    let rate = format!("{}k", bitrate.value);
                    args.extend([
                        "-b:v".into(),
                        rate.clone(),
                        "-maxrate".into(),
                        rate.clone(),
                        "-bufsize".into(),
                        rate,
                    ]);
                }
                BitrateMode::Vbr => {
                    args.extend(["-b:v".into(), format!("{}k", bitrate.value)]);
                }
            }
        }
        None => {
            args.push("-vn".into());
        }
    }

    match audio_codec.encoder() {
        Some(encoder) => {
            let audio_bitrate = require(spec.audio_bitrate, "audio bitrate")?;
            args.extend([
                "-c:a".into(),
                encoder.into(),
                "-b:a".into(),
                format!("{}k", audio_bitrate),
                // Force a stereo downmix; surround sources otherwise fail
                // on encoders without matching channel layouts.
                "-ac".into(),
                "2".into(),
            ]);
        }
        None => {
            args.push("-an".into());
        }
    }

    args.extend(streaming_args(container).iter().map(|s| s.to_string()));
    args.extend(["-y".into(), output.to_string_lossy().into_owned()]);

    Ok(args)
}

/// Build the ffmpeg argument sequence producing one HLS rendition:
/// ~1-second fMP4 segments, a shared `init.mp4`, zero-padded
/// `chunk_NNN.mp4` names, and a `playlist.m3u8` used as the
/// pregeneration sentinel.
pub fn hls_encode_args(resolution: Resolution, input: &Path, out_dir: &Path) -> Vec<String> {
    let keyframe_expr = format!("expr:gte(t,n_forced*{})", HLS_SEGMENT_SECONDS);

    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vf".into(),
        scale_crop_filter(resolution),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "fast".into(),
        "-threads".into(),
        "0".into(),
        "-crf".into(),
        "25".into(),
        // Keyframe every segment boundary so segments cut cleanly.
        "-force_key_frames".into(),
        keyframe_expr,
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        "128k".into(),
        "-ac".into(),
        "2".into(),
        "-f".into(),
        "hls".into(),
        "-hls_time".into(),
        HLS_SEGMENT_SECONDS.to_string(),
        "-hls_playlist_type".into(),
        "vod".into(),
        "-hls_segment_type".into(),
        "fmp4".into(),
        "-hls_fmp4_init_filename".into(),
        "init.mp4".into(),
        "-hls_segment_filename".into(),
        out_dir.join("chunk_%03d.mp4").to_string_lossy().into_owned(),
        "-y".into(),
        out_dir.join("playlist.m3u8").to_string_lossy().into_owned(),
    ]
}

/// Generate a synthetic source clip (test pattern plus a 440 Hz tone) so a
/// fresh install has something to serve.
pub async fn generate_test_source(output: &Path) -> Result<()> {
    let args: Vec<String> = vec![
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "testsrc2=duration=60:size=1920x1080:rate=30".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "sine=frequency=440:duration=60".into(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "fast".into(),
        "-crf".into(),
        "25".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        "128k".into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ];

    run_ffmpeg(&args).await
}

/// Run ffmpeg with the given arguments.
///
/// The child is killed if the returned future is dropped, so attaching a
/// caller's cancellation to the invocation is just dropping the await.
/// On nonzero exit the captured stderr is wrapped into the error.
pub async fn run_ffmpeg(args: &[String]) -> Result<()> {
    debug!(args = ?args, "invoking ffmpeg");

    let output = Command::new("ffmpeg")
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffmpeg")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffmpeg", stderr.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopcast_spec::{catalog, AudioCodec, Bitrate, VideoCodec};
    use std::path::PathBuf;

    fn windows(args: &[String], needle: &[&str]) -> bool {
        args.windows(needle.len())
            .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
    }

    #[test]
    fn test_scale_crop_filter() {
        assert_eq!(
            scale_crop_filter(Resolution::new(1280, 720)),
            "scale=1280:720:force_original_aspect_ratio=increase,crop=1280:720"
        );
    }

    #[test]
    fn test_transcode_args_full_spec() {
        let spec = catalog::default_spec();
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")).unwrap();

        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "in.mp4");
        assert!(windows(&args, &["-t", "20"]));
        assert!(windows(
            &args,
            &[
                "-vf",
                "scale=1280:720:force_original_aspect_ratio=increase,crop=1280:720"
            ]
        ));
        assert!(windows(&args, &["-c:v", "libx264", "-r", "30"]));
        assert!(windows(&args, &["-preset", "fast", "-threads", "0"]));
        assert!(windows(&args, &["-crf", "25"]));
        assert!(windows(&args, &["-c:a", "aac", "-b:a", "128k", "-ac", "2"]));
        assert!(windows(
            &args,
            &["-movflags", "+frag_keyframe+empty_moov+default_base_moof"]
        ));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_transcode_args_bitrate_modes() {
        let mut spec = catalog::default_spec();

        spec.bitrate = Some(Bitrate::cbr(3000));
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")).unwrap();
        assert!(windows(
            &args,
            &[
                "-b:v", "3000k", "-maxrate", "3000k", "-bufsize", "3000k"
            ]
        ));

        spec.bitrate = Some(Bitrate::vbr(3000));
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")).unwrap();
        assert!(windows(&args, &["-b:v", "3000k"]));
        assert!(!args.contains(&"-maxrate".to_string()));
    }

    #[test]
    fn test_transcode_args_av1_tuning() {
        let mut spec = catalog::default_spec();
        spec.codec = Some(VideoCodec::Av1);
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.webm")).unwrap();
        assert!(windows(&args, &["-c:v", "libaom-av1"]));
        assert!(windows(&args, &["-cpu-used", "8", "-row-mt", "1", "-tiles", "2x2"]));
    }

    #[test]
    fn test_transcode_args_video_disabled() {
        let mut spec = catalog::default_spec();
        spec.codec = Some(VideoCodec::NoVideo);
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")).unwrap();

        assert!(args.contains(&"-vn".to_string()));
        assert!(!args.contains(&"-vf".to_string()));
        assert!(!args.contains(&"-crf".to_string()));
        assert!(!args.contains(&"-r".to_string()));
        // Audio still present.
        assert!(windows(&args, &["-c:a", "aac"]));
    }

    #[test]
    fn test_transcode_args_audio_disabled() {
        let mut spec = catalog::default_spec();
        spec.audio_codec = Some(AudioCodec::NoAudio);
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")).unwrap();

        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-b:a".to_string()));
        assert!(!args.contains(&"-ac".to_string()));
    }

    #[test]
    fn test_transcode_args_webm_streaming() {
        let mut spec = catalog::default_spec();
        spec.container = Some(Container::Webm);
        let args =
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.webm")).unwrap();
        assert!(windows(&args, &["-f", "webm"]));
        assert!(!args.contains(&"-movflags".to_string()));
    }

    #[test]
    fn test_transcode_args_rejects_unresolved_spec() {
        let spec = VideoSpec::default();
        assert!(matches!(
            transcode_args(&spec, &PathBuf::from("in.mp4"), &PathBuf::from("out.mp4")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hls_encode_args() {
        let args = hls_encode_args(
            Resolution::new(854, 480),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("/streams/bunny/480p"),
        );

        assert!(windows(
            &args,
            &[
                "-vf",
                "scale=854:480:force_original_aspect_ratio=increase,crop=854:480"
            ]
        ));
        assert!(windows(&args, &["-f", "hls", "-hls_time", "1"]));
        assert!(windows(&args, &["-hls_segment_type", "fmp4"]));
        assert!(windows(&args, &["-hls_fmp4_init_filename", "init.mp4"]));
        assert!(windows(
            &args,
            &["-hls_segment_filename", "/streams/bunny/480p/chunk_%03d.mp4"]
        ));
        assert_eq!(args.last().unwrap(), "/streams/bunny/480p/playlist.m3u8");
        assert!(windows(
            &args,
            &["-force_key_frames", "expr:gte(t,n_forced*1)"]
        ));
    }
}

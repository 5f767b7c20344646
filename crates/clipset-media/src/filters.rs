//! FFmpeg filter-graph construction for the trim/crop passes.

use clipset_models::CropWindow;

/// Video chain: inclusive frame-range trim, PTS reset, crop to the window.
///
/// FFmpeg's `trim` filter takes an exclusive end frame, hence
/// `end_frame + 1`; `setpts` makes the kept segment start at time zero.
pub fn video_trim_crop(start_frame: u32, end_frame: u32, window: &CropWindow) -> String {
    format!(
        "[0:v]trim=start_frame={}:end_frame={},setpts=PTS-STARTPTS,crop={}:{}:{}:{}[v]",
        start_frame,
        u64::from(end_frame) + 1,
        window.width(),
        window.height(),
        window.left,
        window.top
    )
}

/// Audio chain: trim to `[start, end)` seconds and reset timestamps.
pub fn audio_trim(start_secs: f64, end_secs: f64) -> String {
    format!(
        "[0:a]atrim=start={:.6}:end={:.6},asetpts=PTS-STARTPTS[a]",
        start_secs, end_secs
    )
}

/// Combined graph for the single-pass trim+crop pipeline: video and audio
/// chains side by side, exposed as `[v]` and `[a]`.
pub fn trim_crop_graph(
    start_frame: u32,
    end_frame: u32,
    window: &CropWindow,
    audio_start_secs: f64,
    audio_end_secs: f64,
) -> String {
    format!(
        "{};{}",
        video_trim_crop(start_frame, end_frame, window),
        audio_trim(audio_start_secs, audio_end_secs)
    )
}

//! Per-fragment control frame detection.

use rc_domain::stream::{ControlFrame, CONTROL_PREFIX};
use rc_domain::StreamFrame;

/// Decide whether one decoded fragment is a control frame or literal text.
///
/// The first `data: ` marker is removed and the rest is parsed as JSON.
/// Only an object with `"type": "context"` and a string-array `chunks`
/// becomes [`StreamFrame::Context`]; everything else (parse failure,
/// another `type`, a bare JSON scalar) is returned verbatim as
/// [`StreamFrame::TextDelta`].
///
/// Text that happens to be a well-formed context object is misread as a
/// frame.  Use [`FramingMode::Delimited`](rc_domain::config::FramingMode)
/// when the backend can guarantee the marker.
pub fn classify(fragment: &str) -> StreamFrame {
    let candidate = fragment.replacen(CONTROL_PREFIX, "", 1);
    match serde_json::from_str::<ControlFrame>(&candidate) {
        Ok(frame) => frame.into(),
        Err(_) => StreamFrame::text(fragment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_context_frame() {
        let frame = classify("data: {\"type\": \"context\", \"chunks\": [\"段落A\", \"段落B\"]}\n\n");
        assert_eq!(
            frame,
            StreamFrame::context(vec!["段落A".into(), "段落B".into()])
        );
    }

    #[test]
    fn bare_context_frame() {
        let frame = classify(r#"{"type":"context","chunks":[]}"#);
        assert_eq!(frame, StreamFrame::context(Vec::new()));
    }

    #[test]
    fn plain_text_is_verbatim() {
        assert_eq!(classify("无法解析的普通文本"), StreamFrame::text("无法解析的普通文本"));
    }

    #[test]
    fn unrecognized_type_is_text() {
        let raw = r#"{"type":"usage","tokens":12}"#;
        assert_eq!(classify(raw), StreamFrame::text(raw));
    }

    #[test]
    fn json_scalar_is_text() {
        // A lone number is valid JSON but never a frame.
        assert_eq!(classify("42"), StreamFrame::text("42"));
    }

    #[test]
    fn partial_frame_is_text() {
        let raw = "data: {\"type\":\"context\",\"chu";
        assert_eq!(classify(raw), StreamFrame::text(raw));
    }

    #[test]
    fn marker_inside_prose_keeps_original_text() {
        let raw = "the data: section below";
        assert_eq!(classify(raw), StreamFrame::text(raw));
    }
}

//! The marker frame protocol.
//!
//! An SSH session is a text-oriented transport that may inject banners,
//! MOTDs and multiplexing notices anywhere in the stream, and a wrapper in
//! the path may fail to propagate the remote exit status. To recover a
//! trustworthy result anyway, the caller's command is wrapped in a remote
//! shell fragment that captures exit status and output itself and smuggles
//! them through the stream in a single delimited frame:
//!
//! ```text
//! TESTINFRA_START;<exit status>;<base64 stdout>;<base64 stderr>;TESTINFRA_END
//! ```
//!
//! The base64 alphabet never contains `;`, so the frame body is split at
//! the first two semicolons only and the remainder before the end marker is
//! the stderr field. Re-splitting greedily would corrupt the frame if the
//! payload alphabet ever grew a semicolon; [`decode`] deliberately does not,
//! and `alphabet_never_contains_delimiter` in the test suite pins the
//! assumption.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{PayloadStream, ProtocolError};
use crate::quote;

/// Start marker, including the field delimiter that follows it.
pub const MARKER_START: &str = "TESTINFRA_START;";

/// End marker.
pub const MARKER_END: &str = "TESTINFRA_END";

/// A decoded marker frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The wrapped command's exit status.
    pub exit_status: i32,

    /// The wrapped command's standard output.
    pub stdout: Vec<u8>,

    /// The wrapped command's standard error.
    pub stderr: Vec<u8>,
}

impl Frame {
    /// Create a new frame.
    #[must_use]
    pub fn new(exit_status: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            exit_status,
            stdout,
            stderr,
        }
    }
}

/// Wrap a logical command in the remote recovery fragment.
///
/// The command runs in an explicit `sh -c` subshell with stdout and stderr
/// redirected into per-invocation temp files, so the frame reflects the
/// caller's command alone, untouched by anything the session prints around
/// it. The fragment emits the frame and removes its temp files on every
/// exit path, including the subshell failing to start.
#[must_use]
pub fn wrap(command: &str) -> String {
    let subshell = quote::sh_wrap(command);
    format!(
        "of=$(mktemp)&&ef=$(mktemp)&&{subshell} >$of 2>$ef; r=$?;\
         echo \"{MARKER_START}$r;$(base64 < $of);$(base64 < $ef);{MARKER_END}\";\
         rm -f $of $ef"
    )
}

/// Encode a frame to its wire form.
///
/// The remote fragment produces the same layout through the `base64` tool;
/// this local counterpart exists for fixtures and round-trip checks.
#[must_use]
pub fn encode(frame: &Frame) -> String {
    format!(
        "{MARKER_START}{};{};{};{MARKER_END}",
        frame.exit_status,
        STANDARD.encode(&frame.stdout),
        STANDARD.encode(&frame.stderr),
    )
}

/// Scan raw transport output for a marker frame and decode it.
///
/// Finds the first start marker, then the first end marker after it; the
/// body in between, minus one trailing delimiter, is split at its first two
/// semicolons into exit status and the two payloads. Remote `base64`
/// implementations line-wrap long output and command substitution keeps the
/// interior newlines, so ASCII whitespace inside a payload field is ignored.
///
/// # Errors
///
/// Returns a [`ProtocolError`] carrying the raw output when either marker
/// is missing or a field fails to parse.
pub fn decode(raw: &[u8]) -> Result<Frame, ProtocolError> {
    let Some(start) = find_pattern(raw, MARKER_START.as_bytes()) else {
        return Err(ProtocolError::MarkerNotFound { raw: raw.to_vec() });
    };
    let body_start = start + MARKER_START.len();

    let Some(end) = find_pattern(&raw[body_start..], MARKER_END.as_bytes()) else {
        return Err(ProtocolError::Truncated { raw: raw.to_vec() });
    };
    let body = &raw[body_start..body_start + end];

    let Some((&b';', body)) = body.split_last() else {
        return Err(ProtocolError::MissingFields { raw: raw.to_vec() });
    };

    let mut fields = body.splitn(3, |&b| b == b';');
    let status_field = fields.next().unwrap_or_default();
    let (Some(stdout_field), Some(stderr_field)) = (fields.next(), fields.next()) else {
        return Err(ProtocolError::MissingFields { raw: raw.to_vec() });
    };

    let status_text = String::from_utf8_lossy(status_field);
    let exit_status = status_text.trim().parse::<i32>().map_err(|_| {
        ProtocolError::InvalidStatus {
            field: status_text.trim().to_string(),
            raw: raw.to_vec(),
        }
    })?;

    let stdout = decode_payload(stdout_field, PayloadStream::Stdout, raw)?;
    let stderr = decode_payload(stderr_field, PayloadStream::Stderr, raw)?;

    Ok(Frame {
        exit_status,
        stdout,
        stderr,
    })
}

fn decode_payload(
    field: &[u8],
    stream: PayloadStream,
    raw: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    let compact: Vec<u8> = field
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(&compact)
        .map_err(|source| ProtocolError::Payload {
            stream,
            source,
            raw: raw.to_vec(),
        })
}

/// Find a byte pattern in a slice.
fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_quotes_the_command() {
        let fragment = wrap("echo hi");
        assert!(fragment.contains("sh -c 'echo hi'"));
        assert!(fragment.starts_with("of=$(mktemp)&&ef=$(mktemp)&&"));
        assert!(fragment.ends_with("rm -f $of $ef"));
        assert!(fragment.contains(MARKER_START));
        assert!(fragment.contains(MARKER_END));
    }

    #[test]
    fn round_trip_simple() {
        let frame = Frame::new(0, b"hello\n".to_vec(), Vec::new());
        let decoded = decode(encode(&frame).as_bytes()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decodes_empty_payload_frame() {
        let decoded = decode(b"TESTINFRA_START;1;;;TESTINFRA_END").unwrap();
        assert_eq!(decoded, Frame::new(1, Vec::new(), Vec::new()));
    }

    #[test]
    fn decodes_frame_surrounded_by_noise() {
        let frame = Frame::new(3, b"out".to_vec(), b"err".to_vec());
        let raw = format!(
            "Welcome to host!\nLast login: yesterday\n{}\nConnection closed.\n",
            encode(&frame)
        );
        assert_eq!(decode(raw.as_bytes()).unwrap(), frame);
    }

    #[test]
    fn decodes_line_wrapped_base64() {
        let payload = vec![b'a'; 120];
        let mut encoded = STANDARD.encode(&payload);
        // The base64 tool wraps at 76 columns.
        encoded.insert(76, '\n');
        let raw = format!("TESTINFRA_START;0;{encoded};;TESTINFRA_END");
        let decoded = decode(raw.as_bytes()).unwrap();
        assert_eq!(decoded.stdout, payload);
    }

    #[test]
    fn missing_start_marker() {
        let err = decode(b"no frame here\n").unwrap_err();
        assert!(matches!(err, ProtocolError::MarkerNotFound { .. }));
        assert_eq!(err.raw(), b"no frame here\n");
    }

    #[test]
    fn missing_end_marker() {
        let err = decode(b"TESTINFRA_START;0;;;").unwrap_err();
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn missing_fields() {
        let err = decode(b"TESTINFRA_START;0;;TESTINFRA_END").unwrap_err();
        assert!(matches!(err, ProtocolError::MissingFields { .. }));
    }

    #[test]
    fn non_numeric_status() {
        let err = decode(b"TESTINFRA_START;abc;;;TESTINFRA_END").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidStatus { .. }));
    }

    #[test]
    fn invalid_base64_payload() {
        let err = decode(b"TESTINFRA_START;0;!!!;;TESTINFRA_END").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Payload {
                stream: PayloadStream::Stdout,
                ..
            }
        ));
    }

    #[test]
    fn end_marker_literal_in_payload() {
        // The literal only ever crosses the transport base64-encoded, so it
        // cannot terminate the frame early.
        let frame = Frame::new(0, b"fake TESTINFRA_END marker\n".to_vec(), Vec::new());
        let decoded = decode(encode(&frame).as_bytes()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn semicolons_in_payload_round_trip() {
        let frame = Frame::new(0, b";;;".to_vec(), b"a;b".to_vec());
        let decoded = decode(encode(&frame).as_bytes()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn negative_status_round_trips() {
        let frame = Frame::new(-1, Vec::new(), Vec::new());
        assert_eq!(decode(encode(&frame).as_bytes()).unwrap(), frame);
    }

    #[test]
    fn alphabet_never_contains_delimiter() {
        // The two-semicolon split relies on this staying true.
        let every_byte: Vec<u8> = (0u8..=255).collect();
        let encoded = STANDARD.encode(&every_byte);
        assert!(!encoded.contains(';'));

        let frame = Frame::new(0, every_byte.clone(), every_byte.clone());
        let wire = encode(&frame);
        assert_eq!(wire.matches(';').count(), 4);
        assert_eq!(decode(wire.as_bytes()).unwrap(), frame);
    }
}

//! Human-readable error descriptions and structured JSON error formatting.

use scale_core::OverrideValidationError;
use scale_traits::ConnectionError;

fn connection_error(err: &eyre::Report) -> Option<&ConnectionError> {
    err.chain().find_map(|e| e.downcast_ref::<ConnectionError>())
}

fn override_error(err: &eyre::Report) -> Option<&OverrideValidationError> {
    err.chain()
        .find_map(|e| e.downcast_ref::<OverrideValidationError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = connection_error(err) {
        return match ce {
            ConnectionError::PortNotFound { port } => format!(
                "What happened: Serial port {port:?} was not found.\nLikely causes: The scale is unplugged or the port name is misspelled.\nHow to fix: Run `scale ports` to list devices, then pass one with --port (an index or a name such as COM3)."
            ),
            ConnectionError::Busy { port } => format!(
                "What happened: Serial port {port} is in use.\nLikely causes: Another program (a terminal or the vendor utility) holds the port open.\nHow to fix: Close the other program, then rerun."
            ),
            ConnectionError::IoFailure { port, message } => format!(
                "What happened: Could not talk to {port} ({message}).\nLikely causes: No permission on the device node, or a USB adapter driver fault.\nHow to fix: On Linux add your user to the `dialout` group; otherwise replug the adapter and retry."
            ),
            ConnectionError::Disconnected { port, message } => format!(
                "What happened: Lost the connection to {port} ({message}).\nLikely causes: The cable was pulled or the scale powered off.\nHow to fix: Reconnect the scale and rerun; retry behaviour is set under [reconnect] in the config."
            ),
        };
    }

    if let Some(oe) = override_error(err) {
        return format!(
            "What happened: Override rejected ({oe}).\nLikely causes: The body is not JSON or its weight is not a number.\nHow to fix: Pass a body such as --override '{{\"weight\": 2.5}}'. The simulated weight was not changed."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.contains("parse config") {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid{cause}.\nLikely causes: A mistyped key or an out-of-range value in the TOML.\nHow to fix: Edit the config file and try again; every setting can be omitted to use its default."
        );
    }

    if lower.contains("no serial ports") {
        return "What happened: No serial ports were found.\nLikely causes: The scale's USB adapter is unplugged or its driver is missing.\nHow to fix: Connect the scale and run `scale ports`, or use --simulate.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class; anything unclassified is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = connection_error(err) {
        return match ce {
            ConnectionError::PortNotFound { .. } => 3,
            ConnectionError::Busy { .. } => 4,
            ConnectionError::IoFailure { .. } => 5,
            ConnectionError::Disconnected { .. } => 6,
        };
    }
    if override_error(err).is_some() {
        return 7;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(ce) = connection_error(err) {
        return json!({ "reason": ce.kind_name(), "port": ce.port(), "message": humanize(err) })
            .to_string();
    }
    if override_error(err).is_some() {
        return json!({ "reason": "OverrideValidation", "message": humanize(err) }).to_string();
    }

    // Generic error JSON
    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}

use log::debug;

use common::RawTrigger;

/// Decodes one line received from the rig. Anything that is not a plain decimal
/// timestamp is dropped here and only shows up in the debug log.
pub(crate) fn decode_line(line: &[u8]) -> Option<RawTrigger> {
    let line = String::from_utf8_lossy(line);
    match line.parse::<RawTrigger>() {
        Ok(trigger) => Some(trigger),
        Err(e) => {
            debug!("Dropping line from device: {}", e);
            None
        }
    }
}

/// Formats a trigger the way the firmware prints it.
pub(crate) fn encode_line(trigger: RawTrigger) -> String {
    format!("{}\r\n", trigger.as_micros())
}

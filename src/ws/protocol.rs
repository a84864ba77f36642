//! Role announcements: the first frame a client sends.
//!
//! - Devices send `NODEMCU:<id>`; `<id>` is everything after the first colon.
//! - Viewers send exactly `BROWSER`.

/// Prefix of a device announcement, up to and including the separator.
pub const DEVICE_PREFIX: &str = "NODEMCU:";

/// Literal viewer announcement.
pub const VIEWER_ANNOUNCEMENT: &str = "BROWSER";

/// A recognized role announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// A telemetry device with its identifier.
    Device(String),
    /// A dashboard viewer.
    Viewer,
}

impl Announcement {
    /// Parses a frame as an announcement.
    ///
    /// Returns `None` for anything else, including a device prefix with an
    /// empty identifier.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(id) = text.strip_prefix(DEVICE_PREFIX) {
            return (!id.is_empty()).then(|| Self::Device(id.to_string()));
        }
        (text == VIEWER_ANNOUNCEMENT).then_some(Self::Viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device() {
        assert_eq!(
            Announcement::parse("NODEMCU:line-1"),
            Some(Announcement::Device("line-1".to_string()))
        );
    }

    #[test]
    fn device_id_keeps_later_colons() {
        assert_eq!(
            Announcement::parse("NODEMCU:a:b"),
            Some(Announcement::Device("a:b".to_string()))
        );
    }

    #[test]
    fn empty_device_id_is_not_an_announcement() {
        assert_eq!(Announcement::parse("NODEMCU:"), None);
    }

    #[test]
    fn parses_viewer() {
        assert_eq!(Announcement::parse("BROWSER"), Some(Announcement::Viewer));
    }

    #[test]
    fn viewer_must_match_exactly() {
        assert_eq!(Announcement::parse("BROWSER "), None);
        assert_eq!(Announcement::parse("browser"), None);
    }

    #[test]
    fn other_text_is_not_an_announcement() {
        assert_eq!(Announcement::parse(r#"{"supply_voltage":1}"#), None);
        assert_eq!(Announcement::parse(""), None);
    }
}

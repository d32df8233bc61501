//! Catalogue of the self-hosted services tunnels usually point at: the
//! presets offered when creating a tunnel and the display names shown on
//! cards.

/// A service preset offered by the creation form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServicePreset {
    pub label: &'static str,
    /// Default target port, 0 for the custom preset.
    pub port: u16,
    pub service_type: &'static str,
}

impl ServicePreset {
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        self.port == 0
    }
}

pub const PRESETS: [ServicePreset; 6] = [
    ServicePreset {
        label: "Home Assistant",
        port: 8123,
        service_type: "homeassistant",
    },
    ServicePreset {
        label: "Jellyfin",
        port: 8096,
        service_type: "jellyfin",
    },
    ServicePreset {
        label: "Nextcloud",
        port: 443,
        service_type: "nextcloud",
    },
    ServicePreset {
        label: "Plex",
        port: 32400,
        service_type: "plex",
    },
    ServicePreset {
        label: "HTTP",
        port: 80,
        service_type: "http",
    },
    ServicePreset {
        label: "Custom",
        port: 0,
        service_type: "custom",
    },
];

/// Fallback name for unknown or missing service types.
pub const OTHER_SERVICE: &str = "Other";

/// Finds a preset by its `service_type` key.
#[must_use]
pub fn preset(service_type: &str) -> Option<(usize, &'static ServicePreset)> {
    PRESETS
        .iter()
        .enumerate()
        .find(|(_, preset)| preset.service_type.eq_ignore_ascii_case(service_type.trim()))
}

/// Display name for a tunnel's `service_type`.
#[must_use]
pub fn service_name(service_type: Option<&str>) -> &'static str {
    match service_type.map(str::trim) {
        Some("homeassistant") => "Home Assistant",
        Some("jellyfin") => "Jellyfin",
        Some("plex") => "Plex",
        Some("nextcloud") => "Nextcloud",
        Some("camera") => "IP Camera",
        Some("http") => "HTTP",
        _ => OTHER_SERVICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_services_have_names() {
        assert_eq!(service_name(Some("homeassistant")), "Home Assistant");
        assert_eq!(service_name(Some("camera")), "IP Camera");
        assert_eq!(service_name(Some("custom")), OTHER_SERVICE);
        assert_eq!(service_name(None), OTHER_SERVICE);
    }

    #[test]
    fn preset_lookup_is_case_insensitive() {
        let (index, found) = preset("Plex").map(|(i, p)| (i, *p)).unwrap_or((99, PRESETS[0]));
        assert_eq!(index, 3);
        assert_eq!(found.port, 32400);
        assert!(preset("gopher").is_none());
    }

    #[test]
    fn only_the_last_preset_is_custom() {
        let custom: Vec<_> = PRESETS.iter().filter(|p| p.is_custom()).collect();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].service_type, "custom");
    }
}

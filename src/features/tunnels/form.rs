//! State of the tunnel creation form: subdomain input, service preset,
//! custom port and the submit gate.

use crate::{
    api::ApiError,
    config::TUNNEL_DOMAIN,
    features::tunnels::{
        availability::Availability,
        services::{ServicePreset, PRESETS},
        types::CreateTunnelRequest,
    },
};

/// DNS label limit.
pub const MAX_SUBDOMAIN_LEN: usize = 63;
/// Shortest subdomain worth checking or submitting.
pub const MIN_SUBDOMAIN_LEN: usize = 2;

/// Lowercases and keeps only `[a-z0-9-]`, capped at 63 characters.
#[must_use]
pub fn sanitize_subdomain(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(MAX_SUBDOMAIN_LEN)
        .collect()
}

#[derive(Clone, Debug)]
pub struct CreateTunnelForm {
    subdomain: String,
    preset: usize,
    custom_port: String,
    availability: Availability,
    creating: bool,
}

impl Default for CreateTunnelForm {
    fn default() -> Self {
        Self {
            subdomain: String::new(),
            preset: 0,
            custom_port: String::new(),
            availability: Availability::Unknown,
            creating: false,
        }
    }
}

impl CreateTunnelForm {
    /// Stores the sanitised subdomain and returns it for the availability
    /// check. Changing the value invalidates the previous availability.
    pub fn set_subdomain(&mut self, input: &str) -> &str {
        let sanitized = sanitize_subdomain(input);
        if sanitized != self.subdomain {
            self.availability = Availability::Unknown;
        }
        self.subdomain = sanitized;
        &self.subdomain
    }

    #[must_use]
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Records an availability result for the current subdomain.
    pub fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    #[must_use]
    pub const fn availability(&self) -> Availability {
        self.availability
    }

    /// Selects a preset by index; out-of-range indexes are ignored.
    pub fn select_preset(&mut self, index: usize) {
        if index < PRESETS.len() {
            self.preset = index;
        }
    }

    #[must_use]
    pub fn preset(&self) -> &'static ServicePreset {
        &PRESETS[self.preset.min(PRESETS.len() - 1)]
    }

    pub fn set_custom_port(&mut self, input: &str) {
        self.custom_port = input.trim().to_string();
    }

    pub fn set_creating(&mut self, creating: bool) {
        self.creating = creating;
    }

    /// Preset port, or the custom port for the custom preset (0 when it
    /// does not parse).
    #[must_use]
    pub fn effective_port(&self) -> u32 {
        let preset = self.preset();
        if preset.is_custom() {
            self.custom_port.parse::<u32>().unwrap_or(0)
        } else {
            u32::from(preset.port)
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        let port = self.effective_port();
        self.subdomain.len() >= MIN_SUBDOMAIN_LEN
            && !self.hyphen_at_edge()
            && self.availability == Availability::Available
            && (1..=u32::from(u16::MAX)).contains(&port)
            && !self.creating
    }

    fn hyphen_at_edge(&self) -> bool {
        self.subdomain.starts_with('-') || self.subdomain.ends_with('-')
    }

    /// Public URL the tunnel will answer on.
    #[must_use]
    pub fn preview_url(&self) -> Option<String> {
        (!self.subdomain.is_empty() && self.effective_port() > 0)
            .then(|| format!("https://{}.{TUNNEL_DOMAIN}", self.subdomain))
    }

    /// Builds the create request once the form is submittable.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` naming the first unmet condition.
    pub fn request(&self) -> Result<CreateTunnelRequest, ApiError> {
        if self.subdomain.len() < MIN_SUBDOMAIN_LEN {
            return Err(ApiError::Validation(format!(
                "The subdomain needs at least {MIN_SUBDOMAIN_LEN} characters"
            )));
        }
        if self.hyphen_at_edge() {
            return Err(ApiError::Validation(
                "The subdomain cannot start or end with a hyphen".to_string(),
            ));
        }
        match self.availability {
            Availability::Available => {}
            Availability::Taken => {
                return Err(ApiError::Validation(
                    "This subdomain is already taken".to_string(),
                ))
            }
            Availability::Unknown | Availability::Checking => {
                return Err(ApiError::Validation(
                    "Subdomain availability is not confirmed yet".to_string(),
                ))
            }
        }
        let target_port = u16::try_from(self.effective_port())
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| ApiError::Validation("The port must be between 1 and 65535".to_string()))?;
        if self.creating {
            return Err(ApiError::Validation(
                "A tunnel is already being created".to_string(),
            ));
        }

        Ok(CreateTunnelRequest {
            subdomain: self.subdomain.to_lowercase(),
            target_port,
            service_type: self.preset().service_type.to_string(),
        })
    }

    /// Back to the initial state after a successful creation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

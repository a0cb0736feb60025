use serde::{Deserialize, Serialize};

/// A delivery channel for business notifications.
///
/// # Examples
///
/// ```
/// use relaypost_common::types::Channel;
///
/// let ch: Channel = "whatsapp".parse().unwrap();
/// assert_eq!(ch, Channel::Whatsapp);
/// assert_eq!(ch.to_string(), "whatsapp");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
    Push,
}

impl Channel {
    /// All channels, in the fixed display order used across the admin UI.
    pub const ALL: [Channel; 4] = [Channel::Email, Channel::Sms, Channel::Whatsapp, Channel::Push];

    /// The kind of contact address this channel delivers to.
    pub fn address_kind(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms | Channel::Whatsapp => "phone",
            Channel::Push => "device_token",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Sms => write!(f, "sms"),
            Channel::Whatsapp => write!(f, "whatsapp"),
            Channel::Push => write!(f, "push"),
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            "push" => Ok(Channel::Push),
            _ => Err(format!("unknown channel: {s}")),
        }
    }
}

/// A recipient role a notification event may address.
///
/// Ordering is significant: the admin UI always lists roles in
/// admin → retailer → customer order, and the template editor's default
/// tab is the first role present in that order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    Admin,
    Retailer,
    Customer,
}

impl RecipientRole {
    pub const ALL: [RecipientRole; 3] = [
        RecipientRole::Admin,
        RecipientRole::Retailer,
        RecipientRole::Customer,
    ];
}

impl std::fmt::Display for RecipientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientRole::Admin => write!(f, "admin"),
            RecipientRole::Retailer => write!(f, "retailer"),
            RecipientRole::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for RecipientRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(RecipientRole::Admin),
            "retailer" => Ok(RecipientRole::Retailer),
            "customer" => Ok(RecipientRole::Customer),
            _ => Err(format!("unknown recipient role: {s}")),
        }
    }
}

/// Derived configuration state of one channel's provider credentials.
///
/// `Unknown` is the pre-load state; transitions happen only on load
/// results, save outcomes and connectivity-test outcomes (see
/// `relaypost-notify`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Unknown,
    Configured,
    NotConfigured,
    Error,
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelStatus::Unknown => write!(f, "unknown"),
            ChannelStatus::Configured => write!(f, "configured"),
            ChannelStatus::NotConfigured => write!(f, "not_configured"),
            ChannelStatus::Error => write!(f, "error"),
        }
    }
}

/// Uniform result of a connectivity test or a test send.
///
/// Both operations return this same shape so callers can treat
/// "test credentials" and "send test message" identically. Failures are
/// data, never panics: `message` is a short human-readable category and
/// `details` carries the underlying cause when one is available.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeliveryReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DeliveryReport {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn failed_with(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

/// A candidate recipient for test sends, as returned by the directory
/// lookup (`GET /v1/notifications/recipients/{role}`).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecipientCandidate {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Push token, when the recipient has a registered device.
    pub device_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_roundtrips_through_strings() {
        for ch in Channel::ALL {
            let parsed: Channel = ch.to_string().parse().unwrap();
            assert_eq!(parsed, ch);
        }
        assert!("telegram".parse::<Channel>().is_err());
    }

    #[test]
    fn role_order_is_admin_retailer_customer() {
        assert!(RecipientRole::Admin < RecipientRole::Retailer);
        assert!(RecipientRole::Retailer < RecipientRole::Customer);
    }

    #[test]
    fn status_serializes_snake_case() {
        let s = serde_json::to_string(&ChannelStatus::NotConfigured).unwrap();
        assert_eq!(s, "\"not_configured\"");
    }
}

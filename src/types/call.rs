use serde::Serialize;
use uuid::Uuid;

use crate::core::error::Error;

/// Room ids and tokens issued by `initiate-call` are valid for an hour.
pub(crate) const CALL_TOKEN_LIFETIME: u32 = 3600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UserType {
    Rider,
    Driver,
    Courier,
}

impl UserType {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "rider" => Some(Self::Rider),
            "driver" => Some(Self::Driver),
            "courier" => Some(Self::Courier),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Rider => "rider",
            Self::Driver => "driver",
            Self::Courier => "courier",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Rider => "Rider",
            Self::Driver => "Driver",
            Self::Courier => "Courier",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum OrderKind {
    Ride,
    CourierOrder,
    Direct,
}

impl OrderKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Ride => "ride",
            Self::CourierOrder => "courier order",
            Self::Direct => "call",
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct CallerProfile {
    pub(crate) user_type: Option<String>,
    pub(crate) full_name: Option<String>,
}

/// The two parties recorded on a ride (`driver_id`) or courier order
/// (`courier_id`).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Participants {
    pub(crate) rider_id: Option<Uuid>,
    pub(crate) provider_id: Option<Uuid>,
}

/// Checks the caller belongs to the order and returns the other party.
pub(crate) fn counterpart(
    caller_type: UserType,
    caller_id: Uuid,
    kind: OrderKind,
    participants: Participants,
) -> Result<Uuid, Error> {
    let provider = match kind {
        OrderKind::Ride => UserType::Driver,
        _ => UserType::Courier,
    };

    let is_member = match caller_type {
        UserType::Rider => participants.rider_id == Some(caller_id),
        other if other == provider => participants.provider_id == Some(caller_id),
        _ => false,
    };
    if !is_member {
        return Err(Error::forbidden(format!(
            "You are not part of this {}",
            kind.noun()
        )));
    }

    let recipient = match caller_type {
        UserType::Rider => participants.provider_id,
        _ => participants.rider_id,
    };

    recipient.ok_or_else(|| Error::not_found(format!("Recipient not found for this {}", kind.noun())))
}

/// A rider reaches the driver or courier; everyone else reaches the rider.
pub(crate) fn recipient_type(caller_type: UserType, kind: OrderKind) -> UserType {
    match (caller_type, kind) {
        (UserType::Rider, OrderKind::Ride) => UserType::Driver,
        (UserType::Rider, _) => UserType::Courier,
        _ => UserType::Rider,
    }
}

/// Name shown on the recipient's incoming call notification.
pub(crate) fn caller_name(profile: &CallerProfile, caller_type: UserType) -> String {
    match profile.full_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => caller_type.title().to_owned(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ZegoSession {
    pub(crate) token: String,
    pub(crate) app_id: u32,
    pub(crate) user_id: Uuid,
    pub(crate) expires_in: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct Instructions {
    pub(crate) caller: String,
    pub(crate) recipient: String,
}

impl Instructions {
    pub(crate) fn for_room(room_id: &str) -> Self {
        Self {
            caller: format!("Join Zego room \"{room_id}\" using the provided token"),
            recipient: format!(
                "Receiver will get token via FCM notification to join room \"{room_id}\""
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CallRoom {
    pub(crate) room_id: String,
    pub(crate) call_id: Option<Uuid>,
    pub(crate) status: &'static str,
    pub(crate) caller_id: Uuid,
    pub(crate) recipient_id: Option<Uuid>,
    pub(crate) recipient_name: String,
    pub(crate) order_type: OrderKind,
    pub(crate) order_id: Option<Uuid>,
    pub(crate) zego: ZegoSession,
    pub(crate) instructions: Instructions,
}

#[derive(Debug, Serialize)]
pub(crate) struct IssuedToken {
    pub(crate) token: String,
    pub(crate) app_id: u32,
    pub(crate) user_id: Uuid,
    pub(crate) expires_in: u32,
}

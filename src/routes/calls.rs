use std::collections::BTreeMap;

use axum::Extension;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::controllers::call::{NewCallLog, generate_room_id};
use crate::core::error::Error;
use crate::core::push::Notification;
use crate::core::state::AppState;
use crate::token::DEFAULT_EFFECTIVE_TIME;
use crate::types::call::{
    CALL_TOKEN_LIFETIME, CallRoom, Instructions, IssuedToken, OrderKind, UserType, ZegoSession,
    caller_name, counterpart, recipient_type,
};
use crate::types::request::{InitiateCall, ZegoToken};
use crate::types::response::ApiResponse;
use crate::types::user::AuthorizedUser;
use crate::utils::de::parse_number;
use crate::utils::params::non_blank;

/// Lifetime requested by the caller. An unreadable body, or an expiration
/// that is absent, null, zero or empty, means the default.
fn expiration(body: &Bytes) -> Result<u32, Error> {
    let request: ZegoToken = serde_json::from_slice(body).unwrap_or_default();

    let seconds = match request.expiration {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(DEFAULT_EFFECTIVE_TIME),
        Some(Value::String(s)) if s.is_empty() => return Ok(DEFAULT_EFFECTIVE_TIME),
        Some(value) => parse_number(&value),
    };

    match seconds {
        Some(seconds) if seconds == 0.0 => Ok(DEFAULT_EFFECTIVE_TIME),
        Some(seconds) if seconds > 0.0 && seconds.fract() == 0.0 && seconds <= u32::MAX as f64 => {
            Ok(seconds as u32)
        }
        _ => Err(Error::bad_request(
            "expiration must be a positive number of seconds",
        )),
    }
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn generate_zego_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    body: Bytes,
) -> Result<ApiResponse<IssuedToken>, Error> {
    let zego = state.zego()?;
    let expires_in = expiration(&body)?;

    let token = zego.token_for(&user.id.to_string(), expires_in)?;

    Ok(ApiResponse::ok(
        IssuedToken {
            token,
            app_id: zego.app_id,
            user_id: user.id,
            expires_in,
        },
        "Zego token generated",
    ))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn initiate_call(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    body: Bytes,
) -> Result<ApiResponse<CallRoom>, Error> {
    let zego = state.zego()?;
    let calls = &state.call_controller;

    let profile = calls.caller_profile(user.id).await?;
    let caller_type = profile
        .as_ref()
        .and_then(|profile| profile.user_type.as_deref())
        .and_then(UserType::parse)
        .ok_or_else(|| Error::forbidden("Invalid user type"))?;

    let request: InitiateCall = serde_json::from_slice(&body)
        .map_err(|_| Error::bad_request("Invalid JSON payload"))?;
    let requested_room = non_blank(request.room_id.as_deref());

    let order = match (
        non_blank(request.ride_id.as_deref()),
        non_blank(request.courier_order_id.as_deref()),
    ) {
        (Some(ride_id), _) => Some((OrderKind::Ride, ride_id, "Ride not found")),
        (None, Some(order_id)) => Some((OrderKind::CourierOrder, order_id, "Courier order not found")),
        (None, None) if requested_room.is_some() => None,
        (None, None) => {
            return Err(Error::bad_request(
                "ride_id, courier_order_id, or room_id is required",
            ));
        }
    };

    let (kind, order_id, recipient_id) = match order {
        Some((kind, raw_id, missing)) => {
            let (order_id, participants) = calls
                .participants(kind, raw_id)
                .await?
                .ok_or_else(|| Error::not_found(missing))?;
            let recipient = counterpart(caller_type, user.id, kind, participants)?;

            (kind, Some(order_id), Some(recipient))
        }
        None => (OrderKind::Direct, None, None),
    };

    let recipient_name = match recipient_id {
        Some(recipient_id) => calls.display_name(recipient_id).await?,
        None => "User".to_owned(),
    };

    let room_id = requested_room
        .map(str::to_owned)
        .unwrap_or_else(generate_room_id);

    let caller_token = zego.token_for(&user.id.to_string(), CALL_TOKEN_LIFETIME)?;
    let recipient_token = recipient_id
        .map(|id| zego.token_for(&id.to_string(), CALL_TOKEN_LIFETIME))
        .transpose()?;

    let call_id = match (order_id, recipient_id) {
        (Some(order_id), Some(recipient_id)) => {
            let log = NewCallLog {
                kind,
                order_id,
                caller_id: user.id,
                caller_type,
                recipient_id,
                recipient_type: recipient_type(caller_type, kind),
                room_id: &room_id,
            };

            match calls.log_call(&log).await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::error!("Error creating call log: {}", e);
                    None
                }
            }
        }
        _ => None,
    };

    if let (Some(recipient_id), Some(recipient_token), Some(profile)) =
        (recipient_id, recipient_token, profile.as_ref())
    {
        let name = caller_name(profile, caller_type);

        let mut data = BTreeMap::from([
            ("type".to_owned(), "incoming_call".to_owned()),
            ("caller_id".to_owned(), user.id.to_string()),
            ("caller_name".to_owned(), name.clone()),
            ("room_id".to_owned(), room_id.clone()),
            ("token".to_owned(), recipient_token),
            ("app_id".to_owned(), zego.app_id.to_string()),
            ("user_id".to_owned(), recipient_id.to_string()),
        ]);
        if let Some(order_id) = order_id {
            let key = match kind {
                OrderKind::Ride => "ride_id",
                _ => "courier_order_id",
            };
            data.insert(key.to_owned(), order_id.to_string());
        }
        if let Some(call_id) = call_id {
            data.insert("call_id".to_owned(), call_id.to_string());
        }

        notify_recipient(
            &state,
            recipient_id,
            Notification {
                title: "Incoming Call".to_owned(),
                body: format!("{name} is calling you"),
            },
            data,
        );
    }

    tracing::info!("Call room {} initiated", room_id);

    Ok(ApiResponse::ok(
        CallRoom {
            instructions: Instructions::for_room(&room_id),
            room_id,
            call_id,
            status: "initiated",
            caller_id: user.id,
            recipient_id,
            recipient_name,
            order_type: kind,
            order_id,
            zego: ZegoSession {
                token: caller_token,
                app_id: zego.app_id,
                user_id: user.id,
                expires_in: CALL_TOKEN_LIFETIME,
            },
        },
        "Call room created. Use Zego SDK to join the room.",
    ))
}

/// Pushes the incoming call to every active device of the recipient in the
/// background. Failures are only logged.
fn notify_recipient(
    state: &AppState,
    recipient_id: Uuid,
    notification: Notification,
    data: BTreeMap<String, String>,
) {
    let Some(push) = state.push.clone() else {
        tracing::debug!("Push disabled, skipping call notification");
        return;
    };
    let calls = state.call_controller.clone();

    tokio::spawn(async move {
        let tokens = match calls.device_tokens(recipient_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!("FCM notify error: {}", e);
                return;
            }
        };

        match push.send_to_tokens(&tokens, &notification, &data).await {
            Ok(delivered) => tracing::debug!("Call notification delivered to {} devices", delivered),
            Err(e) => tracing::error!("FCM notify error: {}", e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_defaults_and_bounds() {
        assert_eq!(expiration(&Bytes::new()).unwrap(), DEFAULT_EFFECTIVE_TIME);
        assert_eq!(
            expiration(&Bytes::from_static(br#"{"expiration": 0}"#)).unwrap(),
            DEFAULT_EFFECTIVE_TIME
        );
        assert_eq!(
            expiration(&Bytes::from_static(br#"{"expiration": 120}"#)).unwrap(),
            120
        );
        assert!(matches!(
            expiration(&Bytes::from_static(br#"{"expiration": -5}"#)),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn expiration_accepts_numeric_strings_only() {
        assert_eq!(
            expiration(&Bytes::from_static(br#"{"expiration": "7200"}"#)).unwrap(),
            7200
        );
        assert_eq!(
            expiration(&Bytes::from_static(br#"{"expiration": null}"#)).unwrap(),
            DEFAULT_EFFECTIVE_TIME
        );
        assert_eq!(
            expiration(&Bytes::from_static(b"not json")).unwrap(),
            DEFAULT_EFFECTIVE_TIME
        );

        let rejected: [&'static [u8]; 4] = [
            br#"{"expiration": "soon"}"#,
            br#"{"expiration": 90.5}"#,
            br#"{"expiration": true}"#,
            br#"{"expiration": 1e12}"#,
        ];
        for body in rejected {
            assert!(
                matches!(
                    expiration(&Bytes::from_static(body)),
                    Err(Error::BadRequest(message))
                        if message == "expiration must be a positive number of seconds"
                ),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }
}

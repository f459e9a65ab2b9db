pub mod token04;

pub use token04::{
    DEFAULT_EFFECTIVE_TIME, DecodedToken, Privilege, TokenError, TokenInfo, decode_token04,
    generate_token04,
};

use crate::core::config::Args;

/// Real-time-communication app credentials used to sign call tokens.
#[derive(Clone)]
pub struct ZegoCredentials {
    pub app_id: u32,
    server_secret: String,
}

impl std::fmt::Debug for ZegoCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZegoCredentials")
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl ZegoCredentials {
    pub fn new(app_id: u32, server_secret: String) -> Option<Self> {
        if server_secret.chars().count() != 32 {
            return None;
        }

        Some(Self {
            app_id,
            server_secret,
        })
    }

    pub(crate) fn from_args(args: &Args) -> Option<Self> {
        Self::new(args.zego_app_id?, args.zego_server_secret.clone()?)
    }

    pub fn token_for(&self, user_id: &str, effective_time: u32) -> Result<String, TokenError> {
        generate_token04(self.app_id, user_id, &self.server_secret, effective_time, "")
    }

    pub fn decode(&self, token: &str) -> Result<DecodedToken, TokenError> {
        decode_token04(token, &self.server_secret)
    }
}

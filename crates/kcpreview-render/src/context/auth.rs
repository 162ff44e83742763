//! Authentication flow state (`auth`) and the TOTP policy mock.

use std::sync::Arc;

use minijinja::value::{Enumerator, Object};
use minijinja::{Error, ErrorKind, State, Value};
use serde::{Deserialize, Deserializer};
use serde_json::json;

const AUTH_FIELDS: &[&str] = &[
    "attemptedUsername",
    "selectedCredential",
    "authenticationSelections",
    "showTryAnotherWayLink",
    "showUsername",
    "showResetCredentials",
];

/// The `auth` object of a login page.
///
/// Flags accept a real boolean or the string `"true"` (any case). Anything
/// not set in the mock takes its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthContext {
    #[serde(deserialize_with = "lenient_string")]
    pub attempted_username: String,
    pub selected_credential: Option<serde_json::Value>,
    #[serde(deserialize_with = "list_or_empty")]
    pub authentication_selections: Vec<serde_json::Value>,
    #[serde(deserialize_with = "lenient_bool")]
    pub show_try_another_way_link: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub show_username: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub show_reset_credentials: bool,
}

impl AuthContext {
    /// Builds from a mock value; anything but an object gives the defaults.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(raw @ serde_json::Value::Object(_)) => {
                Self::deserialize(raw).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::String(text) => text.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

fn list_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<serde_json::Value>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => Vec::new(),
    })
}

impl Object for AuthContext {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "attemptedUsername" => Some(Value::from(self.attempted_username.as_str())),
            "selectedCredential" => Some(Value::from_serialize(&self.selected_credential)),
            "authenticationSelections" => {
                Some(Value::from_serialize(&self.authentication_selections))
            }
            "showTryAnotherWayLink" => Some(Value::from(self.show_try_another_way_link)),
            "showUsername" => Some(Value::from(self.show_username)),
            "showResetCredentials" => Some(Value::from(self.show_reset_credentials)),
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(AUTH_FIELDS)
    }

    // Templates call the flags as methods: `auth.showUsername()`.
    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        name: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match self.get_value(&Value::from(name)) {
            Some(value) if args.is_empty() => Ok(value),
            Some(_) => Err(Error::new(
                ErrorKind::TooManyArguments,
                format!("auth.{}() takes no arguments", name),
            )),
            None => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("auth has no method '{}'", name),
            )),
        }
    }
}

/// Static one-time-password policy injected into `totp.policy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotpPolicy;

impl TotpPolicy {
    pub const ALGORITHM: &'static str = "HmacSHA1";
    pub const DIGITS: u32 = 6;
    pub const TYPE: &'static str = "totp";
    pub const PERIOD: u32 = 30;
    pub const INITIAL_COUNTER: u32 = 0;

    pub fn to_json(self) -> serde_json::Value {
        json!({
            "algorithm": Self::ALGORITHM,
            "algorithmKey": Self::ALGORITHM,
            "digits": Self::DIGITS,
            "type": Self::TYPE,
            "period": Self::PERIOD,
            "initialCounter": Self::INITIAL_COUNTER,
        })
    }
}

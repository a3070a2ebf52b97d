use serde_json::Value;

/// Successful login body. The vendor returns `userId` as a string or a bare
/// number depending on account age, so this is deserialized by hand.
pub struct UserLogin {
    pub token: String,
    pub user_id: String,
}

impl<'de> serde::Deserialize<'de> for UserLogin {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;

        let token = value
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| serde::de::Error::missing_field("token"))?
            .to_string();

        let user_id = match value.get("userId") {
            Some(Value::String(s)) => s.to_owned(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(serde::de::Error::missing_field("userId")),
        };

        Ok(UserLogin { token, user_id })
    }
}

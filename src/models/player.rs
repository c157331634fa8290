use std::fmt;

use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use chrono::{DateTime, Utc};

/// A stored player row.
/// JSON field names follow the front-end contract (`ID`, `CreatedAt`, ...), not Rust naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Always `None` for rows returned by the API today.
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "XP")]
    pub xp: i64,
    #[serde(rename = "HP")]
    pub hp: i64,
}

/// Body of `POST /api/player`.
///
/// Keys `Name`, `XP` and `HP` are matched ignoring ASCII case, and when a key appears more than
/// once the last non-null value wins. Missing keys and `null` leave the zero value in place.
/// Unknown keys, including client-supplied `ID` or timestamps, are ignored.
#[derive(Debug, Default)]
pub struct CreatePlayerRequest {
    pub name: Option<String>,
    pub xp: Option<i64>,
    pub hp: Option<i64>,
}

impl<'de> Deserialize<'de> for CreatePlayerRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CreatePlayerRequestVisitor)
    }
}

struct CreatePlayerRequestVisitor;

impl<'de> Visitor<'de> for CreatePlayerRequestVisitor {
    type Value = CreatePlayerRequest;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object with optional Name, XP and HP")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut request = CreatePlayerRequest::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("name") {
                if let Some(name) = map.next_value::<Option<String>>()? {
                    request.name = Some(name);
                }
            } else if key.eq_ignore_ascii_case("xp") {
                if let Some(xp) = map.next_value::<Option<i64>>()? {
                    request.xp = Some(xp);
                }
            } else if key.eq_ignore_ascii_case("hp") {
                if let Some(hp) = map.next_value::<Option<i64>>()? {
                    request.hp = Some(hp);
                }
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(request)
    }
}

/// Column values for an insert; identity and timestamps are filled in by Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub xp: i64,
    pub hp: i64,
}

impl CreatePlayerRequest {
    /// Applies the zero-value defaults. No range or format checks are made.
    pub fn into_new_player(self) -> NewPlayer {
        NewPlayer {
            name: self.name.unwrap_or_default(),
            xp: self.xp.unwrap_or_default(),
            hp: self.hp.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<NewPlayer, serde_json::Error> {
        serde_json::from_str::<CreatePlayerRequest>(json).map(CreatePlayerRequest::into_new_player)
    }

    #[test]
    fn test_full_request_deserialization() {
        let player = parse(r#"{"Name":"Aria","XP":10,"HP":100}"#).expect("Failed to deserialize request");

        assert_eq!(
            player,
            NewPlayer { name: "Aria".to_string(), xp: 10, hp: 100 }
        );
    }

    #[test]
    fn test_empty_object_uses_zero_values() {
        let player = parse("{}").unwrap();

        assert_eq!(player, NewPlayer { name: String::new(), xp: 0, hp: 0 });
    }

    #[test]
    fn test_null_fields_use_zero_values() {
        let player = parse(r#"{"Name":null,"XP":null,"HP":7}"#).unwrap();

        assert_eq!(player, NewPlayer { name: String::new(), xp: 0, hp: 7 });
    }

    #[test]
    fn test_unknown_and_server_owned_keys_are_ignored() {
        let player = parse(r#"{"ID":42,"CreatedAt":"2020-01-01T00:00:00Z","Name":"Bo","Level":3}"#).unwrap();

        assert_eq!(player, NewPlayer { name: "Bo".to_string(), xp: 0, hp: 0 });
    }

    #[test]
    fn test_lowercase_keys_are_accepted() {
        let player = parse(r#"{"name":"Cy","xp":1,"hp":2}"#).unwrap();

        assert_eq!(player, NewPlayer { name: "Cy".to_string(), xp: 1, hp: 2 });
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        assert!(parse(r#"{"XP":"not-an-int"}"#).is_err());
        assert!(parse(r#"{"HP":1.5}"#).is_err());
        assert!(parse(r#"{"Name":12}"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(parse("not json").is_err());
        assert!(parse("").is_err());
        assert!(parse("[]").is_err());
    }

    #[test]
    fn test_mixed_case_keys_are_matched() {
        let player = parse(r#"{"NAME":"Up","Xp":3,"hP":4}"#).unwrap();

        assert_eq!(player, NewPlayer { name: "Up".to_string(), xp: 3, hp: 4 });
    }

    #[test]
    fn test_duplicate_key_in_other_case_keeps_last_value() {
        let player = parse(r#"{"Name":"a","name":"b","XP":1,"xp":2}"#).unwrap();

        assert_eq!(player, NewPlayer { name: "b".to_string(), xp: 2, hp: 0 });
    }

    #[test]
    fn test_later_null_does_not_clear_earlier_value() {
        let player = parse(r#"{"HP":5,"hp":null}"#).unwrap();

        assert_eq!(player.hp, 5);
    }

    #[test]
    fn test_player_serialization() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let player = Player {
            id: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: "Aria".to_string(),
            xp: 10,
            hp: 100,
        };

        let json = serde_json::to_string(&player).expect("Failed to serialize player");
        let expected = r#"{"ID":1,"CreatedAt":"2024-05-01T12:00:00Z","UpdatedAt":"2024-05-01T12:00:00Z","DeletedAt":null,"Name":"Aria","XP":10,"HP":100}"#;
        assert_eq!(json, expected);
    }
}
